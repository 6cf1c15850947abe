//! Icon discovery from public assets.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::BuildOutput;

/// Pixel sizes accepted as icon keys.
pub const ICON_SIZES: &[u32] = &[16, 19, 24, 32, 38, 48, 64, 96, 128, 256, 512];

fn icon_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      [
        r"^icon-([0-9]+)\.png$",
        r"^icon-([0-9]+)x[0-9]+\.png$",
        r"^icon@([0-9]+)w\.png$",
        r"^icon@([0-9]+)h\.png$",
        r"^icon@([0-9]+)\.png$",
        r"^icons?/([0-9]+)\.png$",
        r"^icons?/([0-9]+)x[0-9]+\.png$",
      ]
      .into_iter()
      .map(|pattern| Regex::new(pattern).expect("invalid icon regex"))
      .collect()
    })
    .as_slice()
}

fn icon_size(file_name: &str) -> Option<u32> {
  icon_patterns()
    .iter()
    .find_map(|pattern| pattern.captures(file_name))
    .and_then(|captures| captures.get(1))
    .and_then(|size| size.as_str().parse::<u32>().ok())
    .filter(|size| ICON_SIZES.contains(size))
}

/// Map icon sizes to the public assets following one of the icon naming conventions.
///
/// Returns `None` when no asset matched. When two assets claim the same size, the later one in
/// the asset list wins.
pub fn discover_icons(build_output: &BuildOutput) -> Option<BTreeMap<String, String>> {
  let mut icons = BTreeMap::new();

  for asset in &build_output.public_assets {
    let file_name = asset.file_name().replace('\\', "/");
    if let Some(size) = icon_size(&file_name) {
      icons.insert(size.to_string(), file_name);
    }
  }

  (!icons.is_empty()).then_some(icons)
}
