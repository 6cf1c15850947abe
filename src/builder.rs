//! Manifest assembly: merges the generated fragments into the user manifest.

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::asset_paths::entrypoint_bundle_path;
use crate::config::Command;
use crate::context::ManifestContext;
use crate::manifest::{
  ContentScriptGroup, Manifest, SurfaceRule, VersionFields, content_script_css_resources, discover_icons,
  group_content_scripts, reconcile_version, surface_rule,
};
use crate::models::{BuildOutput, Entrypoint, EntrypointKind};

/// Command injected during development to reload the extension from the keyboard.
pub const RELOAD_COMMAND: &str = "wxt:reload-extension";

const RELOAD_COMMAND_KEY: &str = "Alt+R";

const SIDEPANEL_PERMISSION: &str = "sidePanel";

/// High-level helper turning entrypoints and build output into a manifest.
pub struct ManifestBuilder<'a> {
  context: ManifestContext<'a>,
}

impl<'a> ManifestBuilder<'a> {
  /// Create a builder for the provided context.
  pub fn new(context: ManifestContext<'a>) -> Self {
    Self { context }
  }

  /// Assemble the manifest and run the transform hook, if any, over the result.
  ///
  /// Errors returned by the hook are passed through unchanged.
  pub async fn build(
    &self,
    entrypoints: &[Entrypoint],
    build_output: &BuildOutput,
  ) -> anyhow::Result<Manifest> {
    let mut manifest = self.assemble(entrypoints, build_output);

    if let Some(transform) = self.context.transform {
      transform.transform(&mut manifest).await?;
    }

    Ok(manifest)
  }

  /// Assemble the manifest without running the transform hook.
  pub fn assemble(&self, entrypoints: &[Entrypoint], build_output: &BuildOutput) -> Manifest {
    let config = self.context.config;
    let browser = self.context.browser();
    let manifest_version = self.context.manifest_version();
    let out_dir = self.context.out_dir();
    let rule = surface_rule(browser, manifest_version);

    let mut manifest = Manifest::from(config.manifest.clone());
    manifest.insert_if_absent("manifest_version", Value::from(manifest_version.as_u8()));

    let VersionFields {
      version,
      version_name,
    } = reconcile_version(&config.manifest, browser, self.context.logger);
    manifest.insert("version".into(), Value::from(version));
    manifest.remove("version_name");
    if let Some(version_name) = version_name {
      manifest.insert("version_name".into(), Value::from(version_name));
    }

    if !manifest.contains_key("icons")
      && let Some(icons) = discover_icons(build_output)
    {
      let icons: Map<String, Value> = icons
        .into_iter()
        .map(|(size, path)| (size, Value::from(path)))
        .collect();
      manifest.insert("icons".into(), Value::Object(icons));
    }

    for entrypoint in first_of_each_surface(entrypoints) {
      self.add_surface(&mut manifest, rule, entrypoint, &out_dir);
    }
    self.add_sidepanel(&mut manifest, rule, entrypoints, &out_dir);
    self.add_url_overrides(&mut manifest, rule, entrypoints, &out_dir);
    self.add_sandbox(&mut manifest, rule, entrypoints, &out_dir);

    let content_scripts: Vec<Value> = group_content_scripts(entrypoints, build_output, &out_dir)
      .iter()
      .filter_map(|group| self.content_script_entry(group))
      .collect();
    self.append_to_list(&mut manifest, "content_scripts", content_scripts);

    let resources = content_script_css_resources(entrypoints, build_output, manifest_version);
    self.append_to_list(&mut manifest, "web_accessible_resources", resources);

    if self.context.command() == Command::Serve {
      add_reload_command(&mut manifest);
    }

    tracing::debug!(
      browser = %browser,
      manifest_version = manifest_version.as_u8(),
      fields = manifest.len(),
      "assembled extension manifest"
    );

    manifest
  }

  fn add_surface(
    &self,
    manifest: &mut Manifest,
    rule: &SurfaceRule,
    entrypoint: &Entrypoint,
    out_dir: &Path,
  ) {
    match &entrypoint.kind {
      EntrypointKind::Popup(options) => {
        let Some(page) = self.bundle_path(entrypoint, out_dir, ".html") else {
          return;
        };
        let (key, generated) = rule.popup(options, page);
        let merged = merge_object(manifest.get(key), generated);
        manifest.insert(key.into(), merged);
      }
      EntrypointKind::Options(options) => {
        let Some(page) = self.bundle_path(entrypoint, out_dir, ".html") else {
          return;
        };
        manifest.insert_if_absent("options_ui", rule.options_ui(options, page));
      }
      EntrypointKind::Background(options) => {
        let Some(script) = self.bundle_path(entrypoint, out_dir, ".js") else {
          return;
        };
        manifest.insert_if_absent("background", rule.background(options, script));
      }
      EntrypointKind::Devtools => {
        let Some(page) = self.bundle_path(entrypoint, out_dir, ".html") else {
          return;
        };
        manifest.insert_if_absent("devtools_page", Value::from(page));
      }
      EntrypointKind::ContentScript(_)
      | EntrypointKind::Sidepanel(_)
      | EntrypointKind::Newtab
      | EntrypointKind::History
      | EntrypointKind::Bookmarks
      | EntrypointKind::Sandbox
      | EntrypointKind::Unlisted => {}
    }
  }

  fn add_sidepanel(
    &self,
    manifest: &mut Manifest,
    rule: &SurfaceRule,
    entrypoints: &[Entrypoint],
    out_dir: &Path,
  ) {
    let sidepanels: Vec<_> = entrypoints
      .iter()
      .filter_map(|entrypoint| match &entrypoint.kind {
        EntrypointKind::Sidepanel(options) => Some((entrypoint, options)),
        _ => None,
      })
      .collect();
    let Some((entrypoint, options)) = sidepanels
      .iter()
      .find(|(entrypoint, _)| entrypoint.name == "sidepanel")
      .or_else(|| sidepanels.first())
      .copied()
    else {
      return;
    };

    let Some(page) = self.bundle_path(entrypoint, out_dir, ".html") else {
      return;
    };
    match rule.sidepanel(options, page) {
      Some((key, value)) => {
        manifest.insert_if_absent(key, value);
        if key == "side_panel" {
          add_permission(manifest, SIDEPANEL_PERMISSION);
        }
      }
      None => self.context.logger.warn(&format!(
        "Side panel is not supported by {} using MV{}; side_panel.default_path was not added to the manifest",
        self.context.browser(),
        self.context.manifest_version().as_u8()
      )),
    }
  }

  fn add_url_overrides(
    &self,
    manifest: &mut Manifest,
    rule: &SurfaceRule,
    entrypoints: &[Entrypoint],
    out_dir: &Path,
  ) {
    let mut overrides = Map::new();

    for entrypoint in entrypoints {
      let key = match entrypoint.kind {
        EntrypointKind::Newtab => "newtab",
        EntrypointKind::History => "history",
        EntrypointKind::Bookmarks => "bookmarks",
        _ => continue,
      };
      if overrides.contains_key(key) {
        continue;
      }
      if key != "newtab" && !rule.history_overrides {
        self.context.logger.warn(&format!(
          "{} does not support the {key} page override; chrome_url_overrides.{key} was not added to the manifest",
          self.context.browser()
        ));
        continue;
      }
      let Some(page) = self.bundle_path(entrypoint, out_dir, ".html") else {
        continue;
      };
      overrides.insert(key.into(), Value::from(page));
    }

    if overrides.is_empty() {
      return;
    }
    match manifest.get("chrome_url_overrides") {
      Some(Value::Object(user)) => {
        for (key, value) in user {
          overrides.insert(key.clone(), value.clone());
        }
        manifest.insert("chrome_url_overrides".into(), Value::Object(overrides));
      }
      Some(_) => {}
      None => {
        manifest.insert("chrome_url_overrides".into(), Value::Object(overrides));
      }
    }
  }

  fn add_sandbox(
    &self,
    manifest: &mut Manifest,
    rule: &SurfaceRule,
    entrypoints: &[Entrypoint],
    out_dir: &Path,
  ) {
    let pages: Vec<String> = entrypoints
      .iter()
      .filter(|entrypoint| matches!(entrypoint.kind, EntrypointKind::Sandbox))
      .filter_map(|entrypoint| self.bundle_path(entrypoint, out_dir, ".html"))
      .collect();
    if pages.is_empty() {
      return;
    }

    if rule.sandbox {
      manifest.insert_if_absent("sandbox", json!({ "pages": pages }));
    } else {
      self.context.logger.warn(&format!(
        "Sandboxed pages are not supported by {}; sandbox.pages was not added to the manifest",
        self.context.browser()
      ));
    }
  }

  /// Out-dir-relative path of an entrypoint's output, warning when it cannot be resolved.
  fn bundle_path(&self, entrypoint: &Entrypoint, out_dir: &Path, ext: &str) -> Option<String> {
    let path = entrypoint_bundle_path(entrypoint, out_dir, ext);
    if path.is_none() {
      self.context.logger.warn(&format!(
        "Output directory {} of entrypoint \"{}\" is not inside {}; the entrypoint was not added to the manifest",
        entrypoint.output_dir.display(),
        entrypoint.name,
        out_dir.display()
      ));
    }
    path
  }

  fn content_script_entry(&self, group: &ContentScriptGroup) -> Option<Value> {
    if group.js.is_empty() && group.css.is_empty() {
      self.context.logger.warn(&format!(
        "No output files found for content scripts {}; their content_scripts entry was not added to the manifest",
        group.entrypoints.join(", ")
      ));
      return None;
    }
    Some(group.to_manifest_value())
  }

  /// Append generated entries after the user's entries of a list field.
  fn append_to_list(&self, manifest: &mut Manifest, key: &str, generated: Vec<Value>) {
    if generated.is_empty() {
      return;
    }
    match manifest.get_mut(key) {
      Some(Value::Array(entries)) => entries.extend(generated),
      Some(_) => self.context.logger.warn(&format!(
        "\"{key}\" in the manifest configuration is not a list; generated entries were not added"
      )),
      None => {
        manifest.insert(key.into(), Value::Array(generated));
      }
    }
  }
}

/// First entrypoint of every single-instance surface, in input order.
fn first_of_each_surface(entrypoints: &[Entrypoint]) -> Vec<&Entrypoint> {
  let mut seen = Vec::new();
  let mut firsts = Vec::new();
  for entrypoint in entrypoints {
    let surface = match entrypoint.kind {
      EntrypointKind::Popup(_) => "popup",
      EntrypointKind::Options(_) => "options",
      EntrypointKind::Background(_) => "background",
      EntrypointKind::Devtools => "devtools",
      _ => continue,
    };
    if !seen.contains(&surface) {
      seen.push(surface);
      firsts.push(entrypoint);
    }
  }
  firsts
}

/// Overlay generated fields on the user's object under the same key.
fn merge_object(existing: Option<&Value>, generated: Map<String, Value>) -> Value {
  let mut merged = match existing {
    Some(Value::Object(user)) => user.clone(),
    _ => Map::new(),
  };
  merged.extend(generated);
  Value::Object(merged)
}

fn add_permission(manifest: &mut Manifest, permission: &str) {
  if let Value::Array(permissions) = manifest
    .entry("permissions")
    .or_insert_with(|| Value::Array(Vec::new()))
    && !permissions.iter().any(|value| value == permission)
  {
    permissions.push(Value::from(permission));
  }
}

fn add_reload_command(manifest: &mut Manifest) {
  if let Value::Object(commands) = manifest
    .entry("commands")
    .or_insert_with(|| Value::Object(Map::new()))
  {
    commands.entry(RELOAD_COMMAND).or_insert_with(|| {
      json!({
        "description": "Reload the extension during development",
        "suggested_key": { "default": RELOAD_COMMAND_KEY },
      })
    });
  }
}
