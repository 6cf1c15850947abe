//! Warning sink injected into manifest generation, plus subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Narrow logging capability used while generating a manifest.
///
/// Generation only ever reports recoverable problems, so a single `warn` method is enough.
pub trait ManifestLogger: Send + Sync {
  /// Report a recoverable problem.
  fn warn(&self, message: &str);
}

/// Logger forwarding warnings to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl ManifestLogger for TracingLogger {
  fn warn(&self, message: &str) {
    tracing::warn!(target: "webext_manifest", "{message}");
  }
}

/// Initialize a tracing subscriber for command line use.
///
/// Uses the `RUST_LOG` environment variable to pick the log level, defaulting to "info".
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let fmt_layer = fmt::layer()
    .with_target(false)
    .with_level(true)
    .with_writer(std::io::stderr)
    .compact();

  let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

  tracing_subscriber::registry()
    .with(filter_layer)
    .with(fmt_layer)
    .try_init()?;

  Ok(())
}
