#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod builder;
pub mod config;
pub mod context;
pub mod logging;
pub mod manifest;
pub mod models;

pub use builder::{ManifestBuilder, RELOAD_COMMAND};
pub use config::{Command, ConfigError, ManifestConfig, ManifestVersion, TargetBrowser};
pub use context::{ManifestContext, TransformManifest};
pub use logging::{ManifestLogger, TracingLogger};
pub use manifest::Manifest;
pub use models::{BuildOutput, BuildStep, Entrypoint, EntrypointKind, OutputFile};

/// Generate the manifest for a build in one call.
///
/// Shorthand for [`ManifestBuilder::build`] with the given context.
pub async fn generate_manifest(
  entrypoints: &[Entrypoint],
  build_output: &BuildOutput,
  context: ManifestContext<'_>,
) -> anyhow::Result<Manifest> {
  ManifestBuilder::new(context)
    .build(entrypoints, build_output)
    .await
}
