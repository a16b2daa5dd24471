//! Host-facing plugin hooks.
//!
//! A [`Plugin`] is created once per build or watch session and owns its
//! [`CacheStore`]. The host drives it through three hooks:
//!
//! - [`Plugin::resolve`] maps a module id onto a template file and, when
//!   `output_dir` is configured, compiles it to an artifact right away
//! - [`Plugin::load`] returns generated code (or `None` when the host should
//!   read an artifact itself) and registers every file to watch
//! - [`Plugin::on_file_changed`] schedules recompilation for whatever the
//!   changed file affects, ignoring echoes of our own writes
//!
//! The host side of file watching is abstracted by [`WatchRegistry`].
//!
//! # Example
//!
//! ```rust,no_run
//! use ractive_bin::compiler::ProcessCompiler;
//! use ractive_bin::config::PluginConfig;
//! use ractive_bin::plugin::{Plugin, WatchRegistry};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct PrintWatches;
//!
//! impl WatchRegistry for PrintWatches {
//!     fn add_watch_file(&self, path: &Path) {
//!         println!("watching {}", path.display());
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = PluginConfig::default();
//! let compiler = ProcessCompiler::from_config(&config.compiler)?;
//! let plugin = Plugin::new(config, compiler, Arc::new(PrintWatches))?;
//!
//! if let Some(path) = plugin.resolve("views/card").await? {
//!     let code = plugin.load(path.to_str().unwrap_or_default()).await?;
//!     println!("{code:?}");
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheStore, ChangeOutcome};
use crate::compiler::{ComponentCompiler, compile};
use crate::config::PluginConfig;
use crate::core::RbinError;
use crate::resolver::Resolver;
use crate::utils::fs::{
    absolute_path, ensure_dir, file_exists, fingerprint, fingerprint_file, read_text, write_text,
};

/// The host's file-watch registry.
pub trait WatchRegistry: Send + Sync {
    /// Ask the host to report changes to `path`.
    fn add_watch_file(&self, path: &Path);
}

/// One plugin instance with its session cache.
pub struct Plugin<C> {
    config: PluginConfig,
    compiler: C,
    host: Arc<dyn WatchRegistry>,
    resolver: Resolver,
    cache: Mutex<CacheStore>,
}

impl<C> std::fmt::Debug for Plugin<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl<C: ComponentCompiler> Plugin<C> {
    /// Creates a plugin with an empty cache.
    ///
    /// # Errors
    ///
    /// [`RbinError::Config`] if `config` does not validate.
    pub fn new(
        config: PluginConfig,
        compiler: C,
        host: Arc<dyn WatchRegistry>,
    ) -> Result<Self, RbinError> {
        config.validate()?;
        let resolver = Resolver::new(&config);
        Ok(Self {
            config,
            compiler,
            host,
            resolver,
            cache: Mutex::new(CacheStore::new()),
        })
    }

    /// The configuration this plugin was built with.
    #[must_use]
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Runs `f` against the cache store.
    pub fn with_cache<R>(&self, f: impl FnOnce(&CacheStore) -> R) -> R {
        f(&self.cache())
    }

    /// Resolve hook.
    ///
    /// Returns the file the host should load for `id`, or `None` to let
    /// other resolvers handle it. With `output_dir` configured the template
    /// is compiled and the artifact path is returned instead; an artifact
    /// that is still current is reused without compiling.
    ///
    /// # Errors
    ///
    /// Read, compile and write failures for a template that was found.
    pub async fn resolve(&self, id: &str) -> Result<Option<PathBuf>, RbinError> {
        let Some(source_path) = self.resolver.locate(id).await else {
            return Ok(None);
        };

        let Some(output_dir) = self.config.output_dir.as_deref() else {
            return Ok(Some(source_path));
        };

        let current = {
            let cache = self.cache();
            if cache.needs_recompile(id) {
                None
            } else {
                cache
                    .source(id)
                    .filter(|record| record.source_path == source_path)
                    .and_then(|record| record.artifact_path.clone())
            }
        };
        if let Some(artifact) = current {
            if file_exists(&artifact).await {
                tracing::debug!("Reusing artifact {} for {}", artifact.display(), id);
                return Ok(Some(artifact));
            }
        }

        self.compile_redirected(id, &source_path, output_dir).await.map(Some)
    }

    /// Load hook.
    ///
    /// - `id` is one of our artifacts: recompile it first if it carries a
    ///   redo marker, register its dependencies and return `None` so the host
    ///   reads the file itself.
    /// - `id` was compiled before: recompile if invalidated, then return the
    ///   artifact contents or the cached code.
    /// - `id` ends with a configured extension: compile it in memory.
    /// - Otherwise decline with `None`.
    ///
    /// # Errors
    ///
    /// Read, compile and write failures. A failed compile leaves the cache
    /// unchanged.
    pub async fn load(&self, id: &str) -> Result<Option<String>, RbinError> {
        if let Some(artifact_path) = self.known_artifact(id) {
            self.load_artifact(&artifact_path).await?;
            return Ok(None);
        }

        let record = self.cache().source(id).cloned();
        if let Some(record) = record {
            let pending = self.cache().needs_recompile(id);

            if let Some(artifact_path) = record.artifact_path {
                let artifact_path = if pending {
                    let output_dir = self.config.output_dir.as_deref().unwrap_or(Path::new("."));
                    self.compile_redirected(id, &record.source_path, output_dir).await?
                } else {
                    artifact_path
                };
                self.host.add_watch_file(&record.source_path);
                return read_text(&artifact_path).await.map(Some);
            }

            if !pending {
                if let Some(code) = record.code {
                    self.cache().record_hit();
                    tracing::debug!("Cache hit for {}", id);
                    self.watch_all(&record.dependencies);
                    return Ok(Some(code));
                }
            }

            return self.compile_in_memory(id, &record.source_path).await.map(Some);
        }

        if self.config.matching_extension(id).is_some() {
            return self.compile_in_memory(id, Path::new(id)).await.map(Some);
        }

        Ok(None)
    }

    /// Change notification hook.
    ///
    /// Artifacts we wrote are checked for echoes of our own write first; any
    /// other path invalidates every template whose last compile read it.
    pub async fn on_file_changed(&self, path: &Path) -> ChangeOutcome {
        let key = absolute_path(path);

        let is_artifact = self.cache().artifact(&key).is_some();
        if is_artifact {
            let observed = fingerprint_file(&key).await;
            let outcome = self.cache().artifact_changed(&key, observed.as_deref());
            if let Some(outcome) = outcome {
                return outcome;
            }
        }

        self.cache().dependency_changed(&key)
    }

    /// Artifact path keyed by `id`, if `id` names one we wrote.
    fn known_artifact(&self, id: &str) -> Option<PathBuf> {
        let path = absolute_path(Path::new(id));
        self.cache().artifact(&path).map(|_| path)
    }

    async fn load_artifact(&self, artifact_path: &Path) -> Result<(), RbinError> {
        let redo = self.cache().artifact(artifact_path).and_then(|artifact| {
            artifact.redo.clone()
        });

        if let Some(source_id) = redo {
            let source_path = self.cache().source(&source_id).map(|record| record.source_path.clone());
            let output_dir = self.config.output_dir.as_deref().unwrap_or(Path::new("."));
            match source_path {
                Some(source_path) => {
                    tracing::info!("Recompiling {} before serving {}", source_id, artifact_path.display());
                    self.compile_redirected(&source_id, &source_path, output_dir).await?;
                }
                None => tracing::warn!("Redo target {} has no source record", source_id),
            }
        }

        let watches = self
            .cache()
            .artifact(artifact_path)
            .map(|artifact| artifact.watches.clone())
            .unwrap_or_default();
        self.watch_all(&watches);
        Ok(())
    }

    async fn compile_in_memory(&self, id: &str, source_path: &Path) -> Result<String, RbinError> {
        let output = compile(&self.compiler, source_path, &self.config.compile).await?;
        let code = output.code.clone();
        let dependencies = output.dependencies.clone();

        {
            let mut cache = self.cache();
            cache.record_miss();
            cache.record_in_memory(id, source_path, output);
        }

        self.watch_all(&dependencies);
        Ok(code)
    }

    /// Compiles `id` and writes the artifact under `output_dir`.
    async fn compile_redirected(
        &self,
        id: &str,
        source_path: &Path,
        output_dir: &Path,
    ) -> Result<PathBuf, RbinError> {
        let output = compile(&self.compiler, source_path, &self.config.compile).await?;
        let destination = self.artifact_destination(output_dir, id);

        if let Some(parent) = destination.parent() {
            ensure_dir(parent).await?;
        }

        {
            let mut cache = self.cache();
            cache.record_miss();
            cache.record_redirected(
                id,
                source_path,
                &destination,
                output.dependencies,
                fingerprint(output.code.as_bytes()),
            );
        }

        if let Err(e) = write_text(&destination, &output.code).await {
            self.cache().mark_pending(id);
            tracing::error!("{}", e);
            return Err(e);
        }

        tracing::info!("Wrote {}", destination.display());
        Ok(destination)
    }

    /// `output_dir/(id + output_extension)`, absolute.
    ///
    /// Root and parent components of `id` are dropped so the artifact always
    /// lands inside `output_dir`.
    fn artifact_destination(&self, output_dir: &Path, id: &str) -> PathBuf {
        let file = format!("{id}{}", self.config.output_extension);
        let relative: PathBuf = Path::new(&file)
            .components()
            .filter(|component| matches!(component, Component::Normal(_)))
            .collect();
        absolute_path(&output_dir.join(relative))
    }

    fn watch_all(&self, paths: &[PathBuf]) {
        for path in paths {
            self.host.add_watch_file(path);
        }
    }

    fn cache(&self) -> MutexGuard<'_, CacheStore> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
