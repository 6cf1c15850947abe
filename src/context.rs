//! Inputs shared by every stage of a manifest build.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::{Command, ManifestConfig, ManifestVersion, TargetBrowser};
use crate::logging::{ManifestLogger, TracingLogger};
use crate::manifest::Manifest;

/// User hook run once after the manifest has been fully assembled.
///
/// The hook receives the assembled manifest mutably; it may edit fields in place or replace the
/// whole value. Any error it returns aborts generation and is handed back to the caller as is.
#[async_trait]
pub trait TransformManifest: Send + Sync {
  /// Transform the assembled manifest.
  async fn transform(&self, manifest: &mut Manifest) -> anyhow::Result<()>;
}

#[async_trait]
impl<F> TransformManifest for F
where
  F: Fn(&mut Manifest) -> anyhow::Result<()> + Send + Sync,
{
  async fn transform(&self, manifest: &mut Manifest) -> anyhow::Result<()> {
    self(manifest)
  }
}

static DEFAULT_LOGGER: TracingLogger = TracingLogger;

/// Everything a manifest build needs besides the entrypoints and the build output.
#[derive(Clone, Copy)]
pub struct ManifestContext<'a> {
  /// User configuration.
  pub config: &'a ManifestConfig,
  /// Warning sink.
  pub logger: &'a dyn ManifestLogger,
  /// Optional user transform hook.
  pub transform: Option<&'a dyn TransformManifest>,
}

impl<'a> ManifestContext<'a> {
  /// Context logging through `tracing` and without a transform hook.
  pub fn new(config: &'a ManifestConfig) -> Self {
    Self {
      config,
      logger: &DEFAULT_LOGGER,
      transform: None,
    }
  }

  /// Replace the warning sink.
  pub fn with_logger(mut self, logger: &'a dyn ManifestLogger) -> Self {
    self.logger = logger;
    self
  }

  /// Install a transform hook.
  pub fn with_transform(mut self, transform: &'a dyn TransformManifest) -> Self {
    self.transform = Some(transform);
    self
  }

  /// Target browser.
  pub fn browser(&self) -> TargetBrowser {
    self.config.browser
  }

  /// Manifest version in effect.
  pub fn manifest_version(&self) -> ManifestVersion {
    self.config.manifest_version()
  }

  /// Output directory in effect.
  pub fn out_dir(&self) -> PathBuf {
    self.config.out_dir()
  }

  /// Invoking command.
  pub fn command(&self) -> Command {
    self.config.command
  }
}
