//! Browser × manifest version dispatch for the page and background surfaces.
//!
//! Every vendor/version combination maps to one row of [`SURFACE_MATRIX`], which decides the
//! field names and shapes used for the popup, options page, background and side panel. The
//! builders below only read it.

use serde_json::{Map, Value, json};

use crate::config::{ManifestVersion, TargetBrowser};
use crate::models::{
  BackgroundOptions, BackgroundType, OptionsPageOptions, PopupOptions, SidepanelOptions,
};

use BackgroundLayout::{ModuleScripts, PersistentScripts, ServiceWorker};
use OptionsStyle::{BrowserStyle, ChromeStyle};
use PopupLayout::{Action, LegacyAction};
use SidepanelLayout::{SidePanel, SidebarAction, Unsupported};

/// How the background entrypoint is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundLayout {
  /// `background.service_worker` plus `type`.
  ServiceWorker,
  /// `background.scripts` plus `type`, for browsers without service worker backgrounds.
  ModuleScripts,
  /// `background.scripts` plus `persistent`.
  PersistentScripts,
}

/// Where the popup is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupLayout {
  /// `action`.
  Action,
  /// `browser_action` or `page_action`, chosen by the popup's `mv2_key`.
  LegacyAction,
}

/// Which styling flag the options page carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsStyle {
  /// `chrome_style`.
  ChromeStyle,
  /// `browser_style`.
  BrowserStyle,
}

/// How the side panel is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidepanelLayout {
  /// `side_panel.default_path` plus the `sidePanel` permission.
  SidePanel,
  /// `sidebar_action`.
  SidebarAction,
  /// Not available for this combination.
  Unsupported,
}

/// Surface decisions for one browser family and manifest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRule {
  /// Background declaration.
  pub background: BackgroundLayout,
  /// Popup declaration.
  pub popup: PopupLayout,
  /// Options page styling flag.
  pub options_style: OptionsStyle,
  /// Side panel declaration.
  pub sidepanel: SidepanelLayout,
  /// Whether `sandbox.pages` is supported.
  pub sandbox: bool,
  /// Whether the history and bookmarks page overrides are supported.
  pub history_overrides: bool,
}

const fn rule(
  background: BackgroundLayout,
  popup: PopupLayout,
  options_style: OptionsStyle,
  sidepanel: SidepanelLayout,
  chromium_only: bool,
) -> SurfaceRule {
  SurfaceRule {
    background,
    popup,
    options_style,
    sidepanel,
    sandbox: chromium_only,
    history_overrides: chromium_only,
  }
}

/// Surface rules indexed by browser family, then by manifest version (v2, v3).
pub const SURFACE_MATRIX: [[SurfaceRule; 2]; 4] = [
  // Chrome, Edge
  [
    rule(PersistentScripts, LegacyAction, ChromeStyle, Unsupported, true),
    rule(ServiceWorker, Action, ChromeStyle, SidePanel, true),
  ],
  // Opera
  [
    rule(PersistentScripts, LegacyAction, ChromeStyle, SidebarAction, true),
    rule(ServiceWorker, Action, ChromeStyle, SidebarAction, true),
  ],
  // Firefox
  [
    rule(PersistentScripts, LegacyAction, BrowserStyle, SidebarAction, false),
    rule(ModuleScripts, Action, BrowserStyle, SidebarAction, false),
  ],
  // Safari
  [
    rule(PersistentScripts, LegacyAction, ChromeStyle, Unsupported, true),
    rule(ServiceWorker, Action, ChromeStyle, Unsupported, true),
  ],
];

/// Surface rule for a browser and manifest version.
pub fn surface_rule(browser: TargetBrowser, version: ManifestVersion) -> &'static SurfaceRule {
  let family = match browser {
    TargetBrowser::Chrome | TargetBrowser::Edge => 0,
    TargetBrowser::Opera => 1,
    TargetBrowser::Firefox => 2,
    TargetBrowser::Safari => 3,
  };
  let version = match version {
    ManifestVersion::V2 => 0,
    ManifestVersion::V3 => 1,
  };
  &SURFACE_MATRIX[family][version]
}

fn insert_some(fields: &mut Map<String, Value>, key: &str, value: Option<Value>) {
  if let Some(value) = value {
    fields.insert(key.to_string(), value);
  }
}

impl SurfaceRule {
  /// Manifest key and generated fields for the popup page.
  pub fn popup(&self, options: &PopupOptions, page: String) -> (&'static str, Map<String, Value>) {
    let key = match self.popup {
      PopupLayout::Action => "action",
      PopupLayout::LegacyAction => options.mv2_key.unwrap_or_default().as_str(),
    };

    let mut fields = Map::new();
    insert_some(&mut fields, "default_icon", options.default_icon.clone());
    insert_some(
      &mut fields,
      "default_title",
      options.default_title.clone().map(Value::from),
    );
    insert_some(&mut fields, "browser_style", options.browser_style.map(Value::from));
    fields.insert("default_popup".into(), Value::from(page));

    (key, fields)
  }

  /// `options_ui` value for the options page.
  pub fn options_ui(&self, options: &OptionsPageOptions, page: String) -> Value {
    let mut fields = Map::new();
    insert_some(&mut fields, "open_in_tab", options.open_in_tab.map(Value::from));
    match self.options_style {
      OptionsStyle::ChromeStyle => {
        insert_some(&mut fields, "chrome_style", options.chrome_style.map(Value::from));
      }
      OptionsStyle::BrowserStyle => {
        insert_some(&mut fields, "browser_style", options.browser_style.map(Value::from));
      }
    }
    fields.insert("page".into(), Value::from(page));
    Value::Object(fields)
  }

  /// `background` value for the background script.
  pub fn background(&self, options: &BackgroundOptions, script: String) -> Value {
    let module_type = (options.background_type == Some(BackgroundType::Module)).then_some("module");

    let mut fields = Map::new();
    match self.background {
      BackgroundLayout::ServiceWorker => {
        fields.insert("service_worker".into(), Value::from(script));
        insert_some(&mut fields, "type", module_type.map(Value::from));
      }
      BackgroundLayout::ModuleScripts => {
        fields.insert("scripts".into(), json!([script]));
        insert_some(&mut fields, "type", module_type.map(Value::from));
      }
      BackgroundLayout::PersistentScripts => {
        fields.insert("scripts".into(), json!([script]));
        insert_some(&mut fields, "persistent", options.persistent.map(Value::from));
      }
    }
    Value::Object(fields)
  }

  /// Manifest key and value for the side panel page, when supported.
  pub fn sidepanel(&self, options: &SidepanelOptions, page: String) -> Option<(&'static str, Value)> {
    match self.sidepanel {
      SidepanelLayout::SidePanel => Some(("side_panel", json!({ "default_path": page }))),
      SidepanelLayout::SidebarAction => {
        let mut fields = Map::new();
        fields.insert("default_panel".into(), Value::from(page));
        insert_some(&mut fields, "default_icon", options.default_icon.clone());
        insert_some(
          &mut fields,
          "default_title",
          options.default_title.clone().map(Value::from),
        );
        insert_some(&mut fields, "browser_style", options.browser_style.map(Value::from));
        insert_some(
          &mut fields,
          "open_at_install",
          options.open_at_install.map(Value::from),
        );
        Some(("sidebar_action", Value::Object(fields)))
      }
      SidepanelLayout::Unsupported => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Mv2ActionKey;

  const ALL_BROWSERS: [TargetBrowser; 5] = [
    TargetBrowser::Chrome,
    TargetBrowser::Edge,
    TargetBrowser::Opera,
    TargetBrowser::Firefox,
    TargetBrowser::Safari,
  ];

  #[test]
  fn mv3_always_uses_action() {
    for browser in ALL_BROWSERS {
      let rule = surface_rule(browser, ManifestVersion::V3);
      let (key, fields) = rule.popup(&PopupOptions::default(), "popup.html".into());
      assert_eq!(key, "action");
      assert_eq!(fields["default_popup"], "popup.html");
    }
  }

  #[test]
  fn mv2_popup_key_follows_options() {
    let rule = surface_rule(TargetBrowser::Chrome, ManifestVersion::V2);

    let (key, _) = rule.popup(&PopupOptions::default(), "popup.html".into());
    assert_eq!(key, "browser_action");

    let page_action = PopupOptions {
      mv2_key: Some(Mv2ActionKey::PageAction),
      ..PopupOptions::default()
    };
    let (key, _) = rule.popup(&page_action, "popup.html".into());
    assert_eq!(key, "page_action");
  }

  #[test]
  fn background_layout_per_browser_and_version() {
    let options = BackgroundOptions {
      persistent: Some(false),
      background_type: Some(BackgroundType::Module),
    };

    let chrome = surface_rule(TargetBrowser::Chrome, ManifestVersion::V3)
      .background(&options, "background.js".into());
    assert_eq!(chrome, json!({"service_worker": "background.js", "type": "module"}));

    let safari = surface_rule(TargetBrowser::Safari, ManifestVersion::V3)
      .background(&options, "background.js".into());
    assert_eq!(safari, chrome);

    let firefox = surface_rule(TargetBrowser::Firefox, ManifestVersion::V3)
      .background(&options, "background.js".into());
    assert_eq!(firefox, json!({"scripts": ["background.js"], "type": "module"}));

    for browser in ALL_BROWSERS {
      let mv2 = surface_rule(browser, ManifestVersion::V2)
        .background(&options, "background.js".into());
      assert_eq!(mv2, json!({"scripts": ["background.js"], "persistent": false}));
    }
  }

  #[test]
  fn classic_backgrounds_omit_type() {
    let value = surface_rule(TargetBrowser::Chrome, ManifestVersion::V3)
      .background(&BackgroundOptions::default(), "background.js".into());
    assert_eq!(value, json!({"service_worker": "background.js"}));
  }

  #[test]
  fn options_style_depends_on_vendor() {
    let options = OptionsPageOptions {
      open_in_tab: Some(true),
      chrome_style: Some(true),
      browser_style: Some(false),
    };

    let chrome = surface_rule(TargetBrowser::Chrome, ManifestVersion::V3)
      .options_ui(&options, "options.html".into());
    assert_eq!(
      chrome,
      json!({"open_in_tab": true, "chrome_style": true, "page": "options.html"})
    );

    let firefox = surface_rule(TargetBrowser::Firefox, ManifestVersion::V2)
      .options_ui(&options, "options.html".into());
    assert_eq!(
      firefox,
      json!({"open_in_tab": true, "browser_style": false, "page": "options.html"})
    );
  }

  #[test]
  fn sidepanel_layout_per_vendor() {
    let options = SidepanelOptions {
      default_title: Some("Notes".into()),
      ..SidepanelOptions::default()
    };

    let chrome = surface_rule(TargetBrowser::Chrome, ManifestVersion::V3)
      .sidepanel(&options, "sidepanel.html".into());
    assert_eq!(
      chrome,
      Some(("side_panel", json!({"default_path": "sidepanel.html"})))
    );

    let firefox = surface_rule(TargetBrowser::Firefox, ManifestVersion::V2)
      .sidepanel(&options, "sidepanel.html".into());
    assert_eq!(
      firefox,
      Some((
        "sidebar_action",
        json!({"default_panel": "sidepanel.html", "default_title": "Notes"})
      ))
    );

    assert_eq!(
      surface_rule(TargetBrowser::Chrome, ManifestVersion::V2)
        .sidepanel(&options, "sidepanel.html".into()),
      None
    );
  }

  #[test]
  fn firefox_lacks_sandbox_and_history_overrides() {
    for version in [ManifestVersion::V2, ManifestVersion::V3] {
      let rule = surface_rule(TargetBrowser::Firefox, version);
      assert!(!rule.sandbox);
      assert!(!rule.history_overrides);
      assert!(surface_rule(TargetBrowser::Chrome, version).sandbox);
    }
  }
}
