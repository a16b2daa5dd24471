//! Process bridge to an external component compiler.
//!
//! The reference Ractive component builder lives outside Rust, so the
//! default compiler spawns a helper process for each compile and talks to it
//! over newline-delimited JSON on stdin/stdout:
//!
//! ```text
//! host  -> child   {"type":"compile","source":"...","options":{...}}
//! child -> host    {"type":"read","id":1,"path":"shared/b.ract"}       (0..n times)
//! host  -> child   {"type":"content","id":1,"content":"..."}
//!                  {"type":"error","id":1,"message":"..."}
//! child -> host    {"type":"done","code":"..."}
//!                  {"type":"failed","message":"..."}
//! ```
//!
//! `read` requests are served through the compile's [`PartialLoader`], so
//! partials read by the child are recorded as dependencies exactly like
//! in-process compilers. The child's stderr is captured and appended to
//! failure messages.
//!
//! The Node side of the protocol ships inside the binary; a
//! [`BUNDLED_BRIDGE`] argument in the configured command is replaced by its
//! source.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tokio::time::timeout;

use super::{ComponentCompiler, PartialLoader, PartialRef};
use crate::config::{BUNDLED_BRIDGE, CompileOptions, CompilerConfig};
use crate::core::RbinError;

const BRIDGE_SCRIPT: &str = include_str!("../../scripts/ractive-bridge.js");

/// Messages sent to the compiler process.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum HostMessage<'a> {
    Compile {
        source: &'a str,
        options: serde_json::Value,
    },
    Content {
        id: u64,
        content: String,
    },
    Error {
        id: u64,
        message: String,
    },
}

/// Messages received from the compiler process.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BridgeMessage {
    Read {
        id: u64,
        path: PartialRef,
    },
    Done {
        code: String,
    },
    Failed {
        message: String,
    },
}

/// Compiler that delegates to an external process.
///
/// # Examples
///
/// ```rust,no_run
/// use ractive_bin::compiler::ProcessCompiler;
/// use std::time::Duration;
///
/// let compiler = ProcessCompiler::new("node")
///     .arg("scripts/ractive-bridge.js")
///     .with_timeout(Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    program: String,
    args: Vec<String>,
    timeout_duration: Option<Duration>,
}

impl ProcessCompiler {
    /// Creates a bridge running `program` with no arguments and no timeout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout_duration: None,
        }
    }

    /// Builds a bridge from the `[compiler]` configuration table.
    ///
    /// # Errors
    ///
    /// [`RbinError::Config`] if the command is empty.
    ///
    /// Arguments equal to [`BUNDLED_BRIDGE`] become the bundled script.
    pub fn from_config(config: &CompilerConfig) -> Result<Self, RbinError> {
        let (program, args) = config.command.split_first().ok_or_else(|| RbinError::Config {
            message: "compiler.command must name a program".to_string(),
        })?;

        let timeout_duration =
            (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));

        let args = args.iter().map(|arg| {
            if arg == BUNDLED_BRIDGE {
                BRIDGE_SCRIPT.to_string()
            } else {
                arg.clone()
            }
        });

        Ok(Self::new(program.clone()).args(args).with_timeout(timeout_duration))
    }

    /// Adds one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the per-compile timeout (`None` for no timeout).
    #[must_use]
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    async fn run(
        &self,
        source: &str,
        options: &CompileOptions,
        loader: &PartialLoader,
    ) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!("Spawning compiler: {} {}", self.program, self.args.join(" "));
        let mut child = cmd.spawn().map_err(|e| RbinError::Bridge {
            message: format!("failed to start '{}': {e}", self.program),
        })?;

        let (Some(mut stdin), Some(stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(bridge_error("compiler process has no stdio pipes"));
        };

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        send(
            &mut stdin,
            &HostMessage::Compile {
                source,
                options: options.to_json(),
            },
        )
        .await?;

        let mut lines = BufReader::new(stdout).lines();
        let outcome = loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| bridge_error(format!("failed to read compiler output: {e}")))?;

            let Some(line) = line else {
                break Err(bridge_error("compiler exited without producing a result"));
            };
            if line.trim().is_empty() {
                continue;
            }

            let message: BridgeMessage = serde_json::from_str(&line)
                .map_err(|e| bridge_error(format!("unexpected compiler output '{line}': {e}")))?;

            match message {
                BridgeMessage::Read {
                    id,
                    path,
                } => {
                    let reply = match loader.load(path).await {
                        Ok(content) => HostMessage::Content {
                            id,
                            content,
                        },
                        Err(e) => HostMessage::Error {
                            id,
                            message: e.to_string(),
                        },
                    };
                    send(&mut stdin, &reply).await?;
                }
                BridgeMessage::Done {
                    code,
                } => break Ok(code),
                BridgeMessage::Failed {
                    message,
                } => break Err(anyhow::anyhow!(message)),
            }
        };

        drop(stdin);
        let status = child.wait().await;
        let stderr = stderr_task.await.unwrap_or_default();
        tracing::debug!("Compiler process finished: {:?}", status);

        match outcome {
            Ok(code) => Ok(code),
            Err(e) if stderr.trim().is_empty() => Err(e),
            Err(e) => Err(e.context(format!("compiler stderr: {}", stderr.trim()))),
        }
    }
}

impl ComponentCompiler for ProcessCompiler {
    async fn build(
        &self,
        source: &str,
        options: &CompileOptions,
        loader: &PartialLoader,
    ) -> Result<String> {
        let run = self.run(source, options, loader);
        match self.timeout_duration {
            Some(duration) => timeout(duration, run).await.map_err(|_| {
                bridge_error(format!("compiler timed out after {}s", duration.as_secs_f64()))
            })?,
            None => run.await,
        }
    }
}

fn bridge_error(message: impl Into<String>) -> anyhow::Error {
    RbinError::Bridge {
        message: message.into(),
    }
    .into()
}

async fn send(stdin: &mut ChildStdin, message: &HostMessage<'_>) -> Result<()> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| bridge_error(format!("failed to write to compiler: {e}")))?;
    stdin.flush().await.map_err(|e| bridge_error(format!("failed to write to compiler: {e}")))?;
    Ok(())
}
