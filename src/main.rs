//! webext-manifest: generate a browser extension manifest from a build description.
//!
//! Usage: webext-manifest --input <request.json> [--config <file>] [--browser <name>]
//!        [--manifest-version <2|3>] [--serve] [--output <file>]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use webext_manifest::{
  BuildOutput, Command, Entrypoint, ManifestBuilder, ManifestConfig, ManifestContext,
  ManifestVersion, TargetBrowser, logging,
};

/// Generate manifest.json for a browser extension build
#[derive(Parser, Debug)]
#[command(name = "webext-manifest")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// JSON file holding the entrypoints and the bundler output
  #[arg(short, long)]
  input: PathBuf,

  /// Configuration file (defaults to manifest.config.json in the working directory)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Target browser, overriding the configuration
  #[arg(short, long)]
  browser: Option<TargetBrowser>,

  /// Manifest version, overriding the configuration
  #[arg(short, long, value_parser = parse_manifest_version)]
  manifest_version: Option<ManifestVersion>,

  /// Generate for the development server
  #[arg(long)]
  serve: bool,

  /// Write the manifest to this file instead of stdout
  #[arg(short, long)]
  output: Option<PathBuf>,
}

/// Contents of the `--input` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GenerationRequest {
  entrypoints: Vec<Entrypoint>,
  build_output: BuildOutput,
}

fn parse_manifest_version(value: &str) -> Result<ManifestVersion, String> {
  let number: u8 = value
    .parse()
    .map_err(|_| format!("invalid manifest version \"{value}\""))?;
  ManifestVersion::try_from(number)
}

fn load_config(cli: &Cli) -> Result<ManifestConfig> {
  let mut config = match &cli.config {
    Some(path) => ManifestConfig::from_path(path)?,
    None => ManifestConfig::discover(
      &std::env::current_dir().context("failed to resolve working directory")?,
    )?,
  };

  if let Some(browser) = cli.browser {
    config.browser = browser;
  }
  if let Some(version) = cli.manifest_version {
    config.manifest_version = Some(version);
  }
  if cli.serve {
    config.command = Command::Serve;
  }
  Ok(config)
}

fn load_request(path: &Path) -> Result<GenerationRequest> {
  let content =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  logging::init().map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;

  let config = load_config(&cli)?;
  let request = load_request(&cli.input)?;
  tracing::info!(
    browser = %config.browser,
    manifest_version = config.manifest_version().as_u8(),
    entrypoints = request.entrypoints.len(),
    "generating manifest"
  );

  let manifest = ManifestBuilder::new(ManifestContext::new(&config))
    .build(&request.entrypoints, &request.build_output)
    .await?;
  let rendered = manifest
    .to_json_pretty()
    .context("failed to serialize manifest")?;

  match &cli.output {
    Some(path) => {
      if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
      {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      fs::write(path, rendered + "\n")
        .with_context(|| format!("failed to write {}", path.display()))?;
      tracing::info!(path = %path.display(), "wrote manifest");
    }
    None => println!("{rendered}"),
  }

  Ok(())
}
