//! Generation configuration and its JSON loader.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration file searched for by [`ManifestConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "manifest.config.json";

const DEFAULT_OUT_BASE_DIR: &str = ".output";

/// Browser the manifest is generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetBrowser {
  /// Google Chrome.
  #[default]
  Chrome,
  /// Microsoft Edge.
  Edge,
  /// Opera.
  Opera,
  /// Mozilla Firefox.
  Firefox,
  /// Apple Safari.
  Safari,
}

impl TargetBrowser {
  /// Lowercase browser identifier.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Chrome => "chrome",
      Self::Edge => "edge",
      Self::Opera => "opera",
      Self::Firefox => "firefox",
      Self::Safari => "safari",
    }
  }

  /// Whether the browser belongs to the Firefox family.
  pub fn is_firefox(self) -> bool {
    matches!(self, Self::Firefox)
  }
}

impl fmt::Display for TargetBrowser {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TargetBrowser {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.to_ascii_lowercase().as_str() {
      "chrome" => Ok(Self::Chrome),
      "edge" => Ok(Self::Edge),
      "opera" => Ok(Self::Opera),
      "firefox" => Ok(Self::Firefox),
      "safari" => Ok(Self::Safari),
      other => Err(format!(
        "unknown browser \"{other}\", expected chrome, edge, opera, firefox or safari"
      )),
    }
  }
}

/// Manifest schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ManifestVersion {
  /// Manifest v2.
  V2,
  /// Manifest v3.
  V3,
}

impl ManifestVersion {
  /// Numeric manifest version.
  pub fn as_u8(self) -> u8 {
    match self {
      Self::V2 => 2,
      Self::V3 => 3,
    }
  }

  /// Default manifest version for a browser: v2 where v3 support lags, v3 elsewhere.
  pub fn default_for(browser: TargetBrowser) -> Self {
    match browser {
      TargetBrowser::Firefox | TargetBrowser::Safari => Self::V2,
      TargetBrowser::Chrome | TargetBrowser::Edge | TargetBrowser::Opera => Self::V3,
    }
  }
}

impl TryFrom<u8> for ManifestVersion {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      2 => Ok(Self::V2),
      3 => Ok(Self::V3),
      other => Err(format!("unsupported manifest version {other}, expected 2 or 3")),
    }
  }
}

impl From<ManifestVersion> for u8 {
  fn from(version: ManifestVersion) -> Self {
    version.as_u8()
  }
}

/// Command the manifest is generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
  /// Production build.
  #[default]
  Build,
  /// Development server.
  Serve,
}

/// User configuration consumed by manifest generation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestConfig {
  /// Target browser.
  pub browser: TargetBrowser,
  /// Manifest version; defaults per browser when unset.
  pub manifest_version: Option<ManifestVersion>,
  /// Extension output directory; defaults to `.output/<browser>-mv<N>`.
  pub out_dir: Option<PathBuf>,
  /// Invoking command.
  pub command: Command,
  /// User-authored manifest fields, merged with the generated ones.
  pub manifest: Map<String, Value>,
}

/// Errors that can occur while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// Failed to parse the JSON configuration file.
  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl ManifestConfig {
  /// Configuration for a browser with every other setting at its default.
  pub fn for_browser(browser: TargetBrowser) -> Self {
    Self {
      browser,
      ..Self::default()
    }
  }

  /// Load configuration from `manifest.config.json` in the provided directory.
  ///
  /// A missing file yields the default configuration; a file that exists but cannot be read or
  /// parsed is reported as an error.
  pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    if !candidate.exists() {
      return Ok(Self::default());
    }
    Self::from_path(&candidate)
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Manifest version in effect, falling back to the browser default.
  pub fn manifest_version(&self) -> ManifestVersion {
    self
      .manifest_version
      .unwrap_or_else(|| ManifestVersion::default_for(self.browser))
  }

  /// Output directory in effect, falling back to `.output/<browser>-mv<N>`.
  pub fn out_dir(&self) -> PathBuf {
    match &self.out_dir {
      Some(dir) => dir.clone(),
      None => Path::new(DEFAULT_OUT_BASE_DIR).join(format!(
        "{}-mv{}",
        self.browser,
        self.manifest_version().as_u8()
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn defaults_manifest_version_per_browser() {
    assert_eq!(
      ManifestConfig::for_browser(TargetBrowser::Chrome).manifest_version(),
      ManifestVersion::V3
    );
    assert_eq!(
      ManifestConfig::for_browser(TargetBrowser::Firefox).manifest_version(),
      ManifestVersion::V2
    );
    assert_eq!(
      ManifestConfig::for_browser(TargetBrowser::Safari).manifest_version(),
      ManifestVersion::V2
    );
  }

  #[test]
  fn derives_out_dir_from_browser_and_version() {
    let config = ManifestConfig::for_browser(TargetBrowser::Firefox);
    assert_eq!(config.out_dir(), PathBuf::from(".output/firefox-mv2"));

    let config = ManifestConfig {
      manifest_version: Some(ManifestVersion::V3),
      ..ManifestConfig::for_browser(TargetBrowser::Firefox)
    };
    assert_eq!(config.out_dir(), PathBuf::from(".output/firefox-mv3"));
  }

  #[test]
  fn discover_returns_default_for_missing_file() {
    let temp = tempdir().expect("failed to create temp dir");
    let config = ManifestConfig::discover(temp.path()).expect("missing file is not an error");
    assert_eq!(config, ManifestConfig::default());
  }

  #[test]
  fn from_path_reads_configuration() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(
      &path,
      r#"{
        "browser": "firefox",
        "manifestVersion": 3,
        "command": "serve",
        "outDir": "dist",
        "manifest": { "name": "Demo", "version": "1.0.0" }
      }"#,
    )
    .expect("failed to write config file");

    let config = ManifestConfig::from_path(&path).expect("configuration should load");
    assert_eq!(config.browser, TargetBrowser::Firefox);
    assert_eq!(config.manifest_version(), ManifestVersion::V3);
    assert_eq!(config.command, Command::Serve);
    assert_eq!(config.out_dir(), PathBuf::from("dist"));
    assert_eq!(config.manifest["name"], "Demo");
  }

  #[test]
  fn rejects_unknown_manifest_versions() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join(DEFAULT_CONFIG_FILE);
    std::fs::write(&path, r#"{"manifestVersion": 4}"#).expect("failed to write config file");

    let err = ManifestConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("failed to parse"));
  }

  #[test]
  fn parses_browser_names() {
    assert_eq!("firefox".parse::<TargetBrowser>(), Ok(TargetBrowser::Firefox));
    assert_eq!("Edge".parse::<TargetBrowser>(), Ok(TargetBrowser::Edge));
    assert!("netscape".parse::<TargetBrowser>().is_err());
  }
}
