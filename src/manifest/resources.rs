//! Web accessible resources for content scripts injecting their CSS at runtime.

use serde_json::{Value, json};

use crate::asset_paths::strip_path_from_match_pattern;
use crate::config::ManifestVersion;
use crate::models::{BuildOutput, CssInjectionMode, Entrypoint};

/// Generated `web_accessible_resources` entries for `ui` content scripts.
///
/// Manifest v3 entries are scoped to the script's match patterns with their paths stripped;
/// manifest v2 has no scoping, so each stylesheet is listed as a plain string.
pub fn content_script_css_resources(
  entrypoints: &[Entrypoint],
  build_output: &BuildOutput,
  manifest_version: ManifestVersion,
) -> Vec<Value> {
  let mut resources = Vec::new();

  for entrypoint in entrypoints {
    let Some(options) = entrypoint.content_script_options() else {
      continue;
    };
    if options.css_injection_mode() != CssInjectionMode::Ui {
      continue;
    }

    let css_files: Vec<String> = build_output
      .steps
      .iter()
      .flat_map(|step| step.files_for(&entrypoint.name))
      .filter(|file_name| file_name.ends_with(".css"))
      .map(str::to_string)
      .collect();
    if css_files.is_empty() {
      continue;
    }

    match manifest_version {
      ManifestVersion::V2 => resources.extend(css_files.into_iter().map(Value::from)),
      ManifestVersion::V3 => {
        let matches: Vec<String> = options
          .matches
          .iter()
          .map(|pattern| strip_path_from_match_pattern(pattern))
          .collect();
        resources.push(json!({ "matches": matches, "resources": css_files }));
      }
    }
  }

  resources
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{BuildStep, ContentScriptOptions, EntrypointKind, OutputFile};

  fn ui_script(name: &str, matches: &[&str], mode: Option<CssInjectionMode>) -> Entrypoint {
    Entrypoint::new(
      name,
      format!("entrypoints/{name}.content.ts"),
      "out/content-scripts",
      EntrypointKind::ContentScript(ContentScriptOptions {
        matches: matches.iter().map(|pattern| pattern.to_string()).collect(),
        css_injection_mode: mode,
        ..ContentScriptOptions::default()
      }),
    )
  }

  fn output(names: &[&str]) -> BuildOutput {
    BuildOutput {
      public_assets: Vec::new(),
      steps: names
        .iter()
        .map(|name| BuildStep {
          entrypoints: vec![name.to_string()],
          chunks: vec![
            OutputFile::chunk(format!("content-scripts/{name}.js")),
            OutputFile::asset(format!("content-scripts/{name}.css")),
          ],
        })
        .collect(),
    }
  }

  #[test]
  fn scopes_mv3_resources_to_stripped_matches() {
    let entrypoints = vec![ui_script(
      "overlay",
      &["*://play.google.com/books/*", "<all_urls>"],
      Some(CssInjectionMode::Ui),
    )];

    let resources =
      content_script_css_resources(&entrypoints, &output(&["overlay"]), ManifestVersion::V3);

    assert_eq!(resources, vec![json!({
      "matches": ["*://play.google.com/*", "<all_urls>"],
      "resources": ["content-scripts/overlay.css"],
    })]);
  }

  #[test]
  fn lists_plain_file_names_for_mv2() {
    let entrypoints = vec![ui_script("overlay", &["*://*/*"], Some(CssInjectionMode::Ui))];

    let resources =
      content_script_css_resources(&entrypoints, &output(&["overlay"]), ManifestVersion::V2);

    assert_eq!(resources, vec![json!("content-scripts/overlay.css")]);
  }

  #[test]
  fn skips_scripts_not_using_ui_injection() {
    let entrypoints = vec![
      ui_script("declared", &["*://*/*"], None),
      ui_script("manual", &["*://*/*"], Some(CssInjectionMode::Manual)),
    ];

    let resources = content_script_css_resources(
      &entrypoints,
      &output(&["declared", "manual"]),
      ManifestVersion::V3,
    );
    assert!(resources.is_empty());
  }

  #[test]
  fn skips_ui_scripts_without_stylesheets() {
    let entrypoints = vec![ui_script("overlay", &["*://*/*"], Some(CssInjectionMode::Ui))];
    let resources =
      content_script_css_resources(&entrypoints, &BuildOutput::default(), ManifestVersion::V3);
    assert!(resources.is_empty());
  }
}
