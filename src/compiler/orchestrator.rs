//! Drives one compile: read, build, collect dependencies.

use std::path::{Path, PathBuf};

use super::{ComponentCompiler, PartialLoader};
use crate::config::CompileOptions;
use crate::core::RbinError;
use crate::utils::fs::{absolute_path, read_text};

/// Result of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    /// Generated module code.
    pub code: String,
    /// Absolute paths read during the compile; the source is always first.
    pub dependencies: Vec<PathBuf>,
}

/// Compile the template at `source_path`.
///
/// Reads the source as UTF-8, hands it to `compiler` together with the
/// options and a fresh [`PartialLoader`], and returns the generated code with
/// the source path followed by every partial the compiler loaded.
///
/// # Errors
///
/// - [`RbinError::Read`] if the source cannot be read
/// - [`RbinError::Compile`] if the compiler fails
///
/// Both are logged before being returned. Nothing is cached here, so a
/// failed attempt never looks like a success to the caller.
pub async fn compile<C: ComponentCompiler>(
    compiler: &C,
    source_path: &Path,
    options: &CompileOptions,
) -> Result<CompileOutput, RbinError> {
    let source = read_text(source_path).await.inspect_err(|e| {
        tracing::error!("{}", e);
    })?;

    let loader = PartialLoader::new(source_path);
    tracing::info!("Compiling {}", source_path.display());

    let code = match compiler.build(&source, options, &loader).await {
        Ok(code) => code,
        Err(e) => {
            let err = RbinError::Compile {
                path: source_path.to_path_buf(),
                message: format!("{e:#}"),
            };
            tracing::error!("{}", err);
            return Err(err);
        }
    };

    let mut dependencies = vec![absolute_path(source_path)];
    for partial in loader.into_visited() {
        if !dependencies.contains(&partial) {
            dependencies.push(partial);
        }
    }

    tracing::debug!(
        "Compiled {} ({} bytes, {} dependencies)",
        source_path.display(),
        code.len(),
        dependencies.len()
    );

    Ok(CompileOutput {
        code,
        dependencies,
    })
}
