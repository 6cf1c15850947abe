//! Data structures handed to the manifest builder by entrypoint discovery and the bundler.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named buildable unit of the extension, as discovered before bundling.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrypoint {
  /// Entrypoint name, also the stem of its bundled output files.
  pub name: String,
  /// Source file the entrypoint was discovered from.
  pub input_path: PathBuf,
  /// Directory the bundler writes this entrypoint's output into.
  pub output_dir: PathBuf,
  /// Entrypoint type together with its type-specific options.
  pub kind: EntrypointKind,
}

/// Closed set of entrypoint types, each carrying the options relevant to its manifest surface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "options", rename_all = "kebab-case")]
pub enum EntrypointKind {
  /// Toolbar popup page.
  Popup(PopupOptions),
  /// Extension options page.
  Options(OptionsPageOptions),
  /// Background script or service worker.
  Background(BackgroundOptions),
  /// Script injected into matching web pages.
  ContentScript(ContentScriptOptions),
  /// Side panel (Chromium) or sidebar (Firefox, Opera) page.
  Sidepanel(SidepanelOptions),
  /// Devtools page.
  Devtools,
  /// New tab page override.
  Newtab,
  /// History page override.
  History,
  /// Bookmarks page override.
  Bookmarks,
  /// Sandboxed page.
  Sandbox,
  /// Page or script bundled without a manifest surface of its own.
  Unlisted,
}

impl Entrypoint {
  /// Convenience constructor used by discovery code and tests.
  pub fn new(
    name: impl Into<String>,
    input_path: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
    kind: EntrypointKind,
  ) -> Self {
    Self {
      name: name.into(),
      input_path: input_path.into(),
      output_dir: output_dir.into(),
      kind,
    }
  }

  /// Content script options when this entrypoint is a content script.
  pub fn content_script_options(&self) -> Option<&ContentScriptOptions> {
    match &self.kind {
      EntrypointKind::ContentScript(options) => Some(options),
      _ => None,
    }
  }
}

/// Manifest key used for the popup under manifest v2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mv2ActionKey {
  /// `browser_action`
  #[default]
  BrowserAction,
  /// `page_action`
  PageAction,
}

impl Mv2ActionKey {
  /// Manifest field name for this key.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::BrowserAction => "browser_action",
      Self::PageAction => "page_action",
    }
  }
}

/// Popup options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupOptions {
  /// Icon shown in the toolbar; either a path or a size → path map.
  pub default_icon: Option<Value>,
  /// Tooltip title.
  pub default_title: Option<String>,
  /// Firefox-only popup styling flag.
  pub browser_style: Option<bool>,
  /// Which manifest v2 field the popup is declared under.
  pub mv2_key: Option<Mv2ActionKey>,
}

/// Options page options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPageOptions {
  /// Open the options page in a tab rather than embedded.
  pub open_in_tab: Option<bool>,
  /// Chromium styling flag.
  pub chrome_style: Option<bool>,
  /// Firefox styling flag.
  pub browser_style: Option<bool>,
}

/// Module system of the background script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
  /// Classic script.
  #[default]
  Classic,
  /// ES module.
  Module,
}

/// Background options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOptions {
  /// Manifest v2 persistent background page flag.
  pub persistent: Option<bool>,
  /// Script module type.
  #[serde(rename = "type")]
  pub background_type: Option<BackgroundType>,
}

/// When a content script is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunAt {
  /// `document_start`
  DocumentStart,
  /// `document_end`
  DocumentEnd,
  /// `document_idle`
  DocumentIdle,
}

/// JavaScript world a content script executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionWorld {
  /// Isolated extension world.
  Isolated,
  /// The page's main world.
  Main,
}

/// How a content script's stylesheet reaches the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CssInjectionMode {
  /// Declared in the manifest entry.
  #[default]
  Manifest,
  /// Handled by the content script itself.
  Manual,
  /// Injected at runtime into a UI root; the file must be web accessible.
  Ui,
}

/// Content script options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentScriptOptions {
  /// Match patterns the script is injected into.
  pub matches: Vec<String>,
  /// Match patterns excluded from injection.
  pub exclude_matches: Option<Vec<String>>,
  /// Globs applied after `matches`.
  pub include_globs: Option<Vec<String>>,
  /// Globs excluded after `matches`.
  pub exclude_globs: Option<Vec<String>>,
  /// Inject into every frame rather than only the top one.
  pub all_frames: Option<bool>,
  /// Inject into `about:blank` frames.
  pub match_about_blank: Option<bool>,
  /// Inject into frames whose origin matches even without a URL match.
  pub match_origin_as_fallback: Option<bool>,
  /// Injection timing.
  pub run_at: Option<RunAt>,
  /// Execution world.
  pub world: Option<ExecutionWorld>,
  /// Stylesheet injection policy.
  pub css_injection_mode: Option<CssInjectionMode>,
}

impl ContentScriptOptions {
  /// Effective injection mode, treating an unset mode as `manifest`.
  pub fn css_injection_mode(&self) -> CssInjectionMode {
    self.css_injection_mode.unwrap_or_default()
  }
}

/// Side panel options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidepanelOptions {
  /// Sidebar icon.
  pub default_icon: Option<Value>,
  /// Sidebar title.
  pub default_title: Option<String>,
  /// Firefox styling flag.
  pub browser_style: Option<bool>,
  /// Open the sidebar when the extension is installed.
  pub open_at_install: Option<bool>,
}

/// A file emitted by the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputFile {
  /// Compiled script or stylesheet.
  #[serde(rename_all = "camelCase")]
  Chunk {
    /// Path relative to the output directory.
    file_name: String,
  },
  /// Any other emitted file (icons, copied public files, etc.).
  #[serde(rename_all = "camelCase")]
  Asset {
    /// Path relative to the output directory.
    file_name: String,
  },
}

impl OutputFile {
  /// Build a chunk entry.
  pub fn chunk(file_name: impl Into<String>) -> Self {
    Self::Chunk {
      file_name: file_name.into(),
    }
  }

  /// Build an asset entry.
  pub fn asset(file_name: impl Into<String>) -> Self {
    Self::Asset {
      file_name: file_name.into(),
    }
  }

  /// Path of the file relative to the output directory.
  pub fn file_name(&self) -> &str {
    match self {
      Self::Chunk { file_name } | Self::Asset { file_name } => file_name,
    }
  }
}

/// One bundler invocation: the entrypoints it built and the files it produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStep {
  /// Names of the entrypoints built by this step.
  pub entrypoints: Vec<String>,
  /// Files produced by this step.
  pub chunks: Vec<OutputFile>,
}

impl BuildStep {
  /// Whether this step built the named entrypoint.
  pub fn includes(&self, entrypoint_name: &str) -> bool {
    self.entrypoints.iter().any(|name| name == entrypoint_name)
  }

  /// Files of this step attributable to the named entrypoint.
  ///
  /// A step that built a single entrypoint owns all of its files; a shared step only hands out
  /// files whose stem is the entrypoint name.
  pub fn files_for<'a>(&'a self, entrypoint_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let included = self.includes(entrypoint_name);
    let owns_all = included && self.entrypoints.len() == 1;
    self
      .chunks
      .iter()
      .map(OutputFile::file_name)
      .filter(move |file_name| {
        included && (owns_all || file_stem(file_name) == Some(entrypoint_name))
      })
  }
}

/// Complete artifact inventory of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
  /// Files copied from the public directory.
  pub public_assets: Vec<OutputFile>,
  /// Bundler steps in execution order.
  pub steps: Vec<BuildStep>,
}

fn file_stem(file_name: &str) -> Option<&str> {
  Path::new(file_name).file_stem().and_then(|stem| stem.to_str())
}
