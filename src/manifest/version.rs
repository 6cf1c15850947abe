//! `version` and `version_name` reconciliation.

use serde_json::{Map, Value};

use crate::config::TargetBrowser;
use crate::logging::ManifestLogger;

/// Version used when the user manifest does not declare one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Version fields written to the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFields {
  /// Value of `version`.
  pub version: String,
  /// Value of `version_name`, when the manifest should carry one.
  pub version_name: Option<String>,
}

fn version_string(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::String(version) if !version.is_empty() => Some(version.clone()),
    Value::Number(version) => Some(version.to_string()),
    _ => None,
  }
}

/// Resolve the version fields from the user manifest.
///
/// A missing or empty version is reported through the logger and replaced with
/// [`DEFAULT_VERSION`]. `version_name` is only kept when it differs from `version` and the
/// browser accepts the field; Firefox rejects it.
pub fn reconcile_version(
  user_manifest: &Map<String, Value>,
  browser: TargetBrowser,
  logger: &dyn ManifestLogger,
) -> VersionFields {
  let Some(version) = version_string(user_manifest.get("version")) else {
    logger.warn(&format!(
      "Extension version not found, defaulting to \"{DEFAULT_VERSION}\". Add a \"version\" to the manifest configuration."
    ));
    return VersionFields {
      version: DEFAULT_VERSION.to_string(),
      version_name: None,
    };
  };

  let version_name = version_string(user_manifest.get("version_name"))
    .filter(|name| !browser.is_firefox() && *name != version);

  VersionFields {
    version,
    version_name,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::sync::Mutex;

  #[derive(Default)]
  struct RecordingLogger(Mutex<Vec<String>>);

  impl ManifestLogger for RecordingLogger {
    fn warn(&self, message: &str) {
      self.0.lock().unwrap().push(message.to_string());
    }
  }

  fn manifest(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(fields) => fields,
      _ => unreachable!("test manifests are objects"),
    }
  }

  #[test]
  fn defaults_and_warns_when_version_is_missing() {
    let logger = RecordingLogger::default();
    for user in [json!({}), json!({"version": ""}), json!({"version": null, "version_name": "beta"})] {
      let fields = reconcile_version(&manifest(user), TargetBrowser::Chrome, &logger);
      assert_eq!(fields, VersionFields {
        version: "0.0.0".into(),
        version_name: None,
      });
    }

    let warnings = logger.0.lock().unwrap();
    assert_eq!(warnings.len(), 3);
    assert!(warnings[0].contains("Extension version not found"));
  }

  #[test]
  fn keeps_distinct_version_name() {
    let logger = RecordingLogger::default();
    let fields = reconcile_version(
      &manifest(json!({"version": "1.2.3", "version_name": "1.2.3-beta.1"})),
      TargetBrowser::Chrome,
      &logger,
    );
    assert_eq!(fields.version, "1.2.3");
    assert_eq!(fields.version_name.as_deref(), Some("1.2.3-beta.1"));
    assert!(logger.0.lock().unwrap().is_empty());
  }

  #[test]
  fn drops_version_name_equal_to_version() {
    let fields = reconcile_version(
      &manifest(json!({"version": "1.2.3", "version_name": "1.2.3"})),
      TargetBrowser::Chrome,
      &RecordingLogger::default(),
    );
    assert_eq!(fields.version_name, None);
  }

  #[test]
  fn drops_version_name_for_firefox() {
    let fields = reconcile_version(
      &manifest(json!({"version": "1.2.3", "version_name": "1.2.3-beta.1"})),
      TargetBrowser::Firefox,
      &RecordingLogger::default(),
    );
    assert_eq!(fields.version, "1.2.3");
    assert_eq!(fields.version_name, None);
  }

  #[test]
  fn renders_numeric_versions_as_strings() {
    let fields = reconcile_version(
      &manifest(json!({"version": 2})),
      TargetBrowser::Safari,
      &RecordingLogger::default(),
    );
    assert_eq!(fields.version, "2");
  }
}
