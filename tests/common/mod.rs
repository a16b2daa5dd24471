//! Common helpers for ractive-bin integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use ractive_bin::config::PluginConfig;
use ractive_bin::plugin::Plugin;
use ractive_bin::test_utils::{RecordingHost, StubCompiler, TemplateProject, init_test_logging};
use std::path::Path;
use std::sync::Arc;

/// Compiler command for CLI tests: answers every compile with a fixed module.
pub const SH_COMPILER: &str = r#"["sh", "-c", "read -r request; echo '{\"type\":\"done\",\"code\":\"export default 1;\"}'"]"#;

/// A plugin over `project` using the stub compiler and a recording host.
pub struct Harness {
    pub project: TemplateProject,
    pub plugin: Plugin<StubCompiler>,
    pub host: Arc<RecordingHost>,
    pub compiler: StubCompiler,
}

impl Harness {
    /// In-memory compiles with `.ract` templates.
    pub fn in_memory() -> Self {
        Self::with_config(|_| {})
    }

    /// Artifacts written to `<project>/out`.
    pub fn redirected() -> Self {
        Self::with_config(|config| config.output_dir = Some("out".into()))
    }

    /// Start from `.ract`-only defaults and let `configure` adjust them.
    ///
    /// A relative `output_dir` is taken relative to the project root.
    pub fn with_config(configure: impl FnOnce(&mut PluginConfig)) -> Self {
        init_test_logging(None);

        let project = TemplateProject::new().expect("temp project");
        let mut config = PluginConfig {
            extensions: vec![".ract".to_string()],
            ..Default::default()
        };
        configure(&mut config);
        if let Some(dir) = config.output_dir.take() {
            config.output_dir = Some(project.root().join(dir));
        }

        let host = Arc::new(RecordingHost::new());
        let compiler = StubCompiler::new();
        let plugin = Plugin::new(config, compiler.clone(), host.clone()).expect("valid config");

        Self {
            project,
            plugin,
            host,
            compiler,
        }
    }

    /// Absolute id for a path relative to the project.
    pub fn id(&self, rel: &str) -> String {
        self.project.path(rel).to_string_lossy().into_owned()
    }

    /// Overwrite `rel` and notify the plugin.
    pub async fn edit(&self, rel: &str, content: &str) -> ractive_bin::cache::ChangeOutcome {
        let path = self.project.write(rel, content).expect("write template");
        self.plugin.on_file_changed(&path).await
    }
}

/// The binary under test, run from `dir`.
pub fn ractive_bin(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ractive-bin").expect("binary is built");
    cmd.current_dir(dir).env_remove("RACTIVE_BIN_CONFIG").env("RUST_LOG", "error");
    cmd
}
