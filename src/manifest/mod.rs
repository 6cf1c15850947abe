//! Manifest document type and the fragment builders the assembler merges into it.

mod content_scripts;
mod icons;
mod resources;
mod surfaces;
mod version;

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use content_scripts::{ContentScriptGroup, ContentScriptKey, group_content_scripts};
pub use icons::{ICON_SIZES, discover_icons};
pub use resources::content_script_css_resources;
pub use surfaces::{
  BackgroundLayout, OptionsStyle, PopupLayout, SURFACE_MATRIX, SidepanelLayout, SurfaceRule,
  surface_rule,
};
pub use version::{DEFAULT_VERSION, VersionFields, reconcile_version};

/// A browser extension manifest: a JSON object of manifest fields, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
  /// Empty manifest.
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `value` under `key` only when the key is not present yet.
  ///
  /// Returns `true` when the value was inserted.
  pub fn insert_if_absent(&mut self, key: &str, value: Value) -> bool {
    if self.0.contains_key(key) {
      return false;
    }
    self.0.insert(key.to_string(), value);
    true
  }

  /// Consume the manifest into a plain JSON value.
  pub fn into_value(self) -> Value {
    Value::Object(self.0)
  }

  /// Pretty-printed JSON rendering of the manifest.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&self.0)
  }
}

impl From<Map<String, Value>> for Manifest {
  fn from(fields: Map<String, Value>) -> Self {
    Self(fields)
  }
}

impl Deref for Manifest {
  type Target = Map<String, Value>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for Manifest {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn insert_if_absent_keeps_existing_values() {
    let mut manifest = Manifest::new();
    assert!(manifest.insert_if_absent("name", json!("Generated")));
    assert!(!manifest.insert_if_absent("name", json!("Other")));
    assert_eq!(manifest["name"], "Generated");
  }

  #[test]
  fn serializes_as_a_plain_object_with_sorted_keys() {
    let mut manifest = Manifest::new();
    manifest.insert("version".into(), json!("1.0.0"));
    manifest.insert("action".into(), json!({}));

    let rendered = serde_json::to_string(&manifest).unwrap();
    assert_eq!(rendered, r#"{"action":{},"version":"1.0.0"}"#);
  }
}
