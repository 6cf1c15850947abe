//! Group content script entrypoints into manifest `content_scripts` entries.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::asset_paths::entrypoint_bundle_path;
use crate::models::{
  BuildOutput, ContentScriptOptions, CssInjectionMode, Entrypoint, ExecutionWorld, RunAt,
};

/// The manifest-relevant options of a content script.
///
/// Content scripts with equal keys share one manifest entry. `css_injection_mode` is not part
/// of the key since it only decides whether CSS is declared, not where the script runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentScriptKey {
  /// Match patterns.
  pub matches: Vec<String>,
  /// Excluded match patterns.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exclude_matches: Option<Vec<String>>,
  /// Included globs.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub include_globs: Option<Vec<String>>,
  /// Excluded globs.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exclude_globs: Option<Vec<String>>,
  /// Inject into all frames.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub all_frames: Option<bool>,
  /// Inject into `about:blank`.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub match_about_blank: Option<bool>,
  /// Fall back to origin matching.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub match_origin_as_fallback: Option<bool>,
  /// Injection timing.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub run_at: Option<RunAt>,
  /// Execution world.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub world: Option<ExecutionWorld>,
}

impl From<&ContentScriptOptions> for ContentScriptKey {
  fn from(options: &ContentScriptOptions) -> Self {
    Self {
      matches: options.matches.clone(),
      exclude_matches: options.exclude_matches.clone(),
      include_globs: options.include_globs.clone(),
      exclude_globs: options.exclude_globs.clone(),
      all_frames: options.all_frames,
      match_about_blank: options.match_about_blank,
      match_origin_as_fallback: options.match_origin_as_fallback,
      run_at: options.run_at,
      world: options.world,
    }
  }
}

/// One generated `content_scripts` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentScriptGroup {
  /// Shared options of every member.
  pub key: ContentScriptKey,
  /// Names of the member entrypoints, in first-seen order.
  pub entrypoints: Vec<String>,
  /// Compiled scripts of the members.
  pub js: Vec<String>,
  /// Compiled stylesheets declared in the manifest.
  pub css: Vec<String>,
}

impl ContentScriptGroup {
  /// Manifest value of the entry: the key fields plus `css` (when any) and `js`.
  pub fn to_manifest_value(&self) -> Value {
    // The key only holds strings, booleans and unit enums, which always serialize to an object.
    let mut entry = match serde_json::to_value(&self.key) {
      Ok(Value::Object(fields)) => fields,
      _ => serde_json::Map::new(),
    };
    if !self.css.is_empty() {
      entry.insert("css".into(), Value::from(self.css.clone()));
    }
    entry.insert("js".into(), Value::from(self.js.clone()));
    Value::Object(entry)
  }
}

/// Group the content script entrypoints by their manifest options.
///
/// Groups are returned in the order their first member appears. Within a group, files are
/// collected by walking the build steps in order; stylesheets of members injecting CSS as UI or
/// manually are left out. A member without any attributed script falls back to
/// `<name>.js` in its output directory, relative to `out_dir`.
pub fn group_content_scripts(
  entrypoints: &[Entrypoint],
  build_output: &BuildOutput,
  out_dir: &Path,
) -> Vec<ContentScriptGroup> {
  let mut groups: Vec<(ContentScriptGroup, Vec<&Entrypoint>)> = Vec::new();

  for entrypoint in entrypoints {
    let Some(options) = entrypoint.content_script_options() else {
      continue;
    };
    let key = ContentScriptKey::from(options);

    match groups.iter_mut().find(|(group, _)| group.key == key) {
      Some((group, members)) => {
        group.entrypoints.push(entrypoint.name.clone());
        members.push(entrypoint);
      }
      None => groups.push((
        ContentScriptGroup {
          key,
          entrypoints: vec![entrypoint.name.clone()],
          js: Vec::new(),
          css: Vec::new(),
        },
        vec![entrypoint],
      )),
    }
  }

  groups
    .into_iter()
    .map(|(mut group, members)| {
      collect_group_files(&mut group, &members, build_output, out_dir);
      group
    })
    .collect()
}

fn collect_group_files(
  group: &mut ContentScriptGroup,
  members: &[&Entrypoint],
  build_output: &BuildOutput,
  out_dir: &Path,
) {
  let mut has_script = vec![false; members.len()];

  for step in &build_output.steps {
    for (index, member) in members.iter().enumerate() {
      let declares_css = member
        .content_script_options()
        .is_some_and(|options| options.css_injection_mode() == CssInjectionMode::Manifest);

      for file_name in step.files_for(&member.name) {
        if file_name.ends_with(".js") {
          has_script[index] = true;
          group.js.push(file_name.to_string());
        } else if declares_css && file_name.ends_with(".css") {
          group.css.push(file_name.to_string());
        }
      }
    }
  }

  for (member, has_script) in members.iter().zip(has_script) {
    if !has_script && let Some(script) = entrypoint_bundle_path(member, out_dir, ".js") {
      group.js.push(script);
    }
  }
}
