use std::path::Path;

use crate::models::Entrypoint;

/// Lexically normalised path: forward slashes, no `.` segments, `..` folded where possible.
#[derive(Debug, PartialEq, Eq)]
struct Segments {
  absolute: bool,
  parts: Vec<String>,
}

impl Segments {
  fn of(path: &Path) -> Self {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut parts: Vec<String> = Vec::new();
    for part in raw.split('/') {
      match part {
        "" | "." => {}
        ".." if parts.last().is_some_and(|last| last != "..") => {
          parts.pop();
        }
        _ => parts.push(part.to_string()),
      }
    }
    let absolute = raw.starts_with('/') || parts.first().is_some_and(|first| first.ends_with(':'));
    Self { absolute, parts }
  }

  /// Segments of `self` below `base`, when `self` lies inside it.
  ///
  /// An absolute path is matched against a relative base by locating the base's segments in it,
  /// since the relative base is resolved from a working directory somewhere above it.
  fn relative_to<'a>(&'a self, base: &Segments) -> Option<&'a [String]> {
    if self.absolute == base.absolute {
      return self.parts.strip_prefix(base.parts.as_slice());
    }
    if !self.absolute || base.parts.is_empty() {
      return None;
    }
    let len = base.parts.len();
    self
      .parts
      .windows(len)
      .position(|window| window == base.parts.as_slice())
      .map(|start| &self.parts[start + len..])
  }
}

/// Path of an entrypoint's bundled file relative to the extension output directory.
///
/// The generated path always uses forward slashes so that the resulting manifest is identical on
/// every platform, regardless of the native directory separator used by the bundler. Returns
/// `None` when the entrypoint's output directory is not inside `out_dir`.
pub fn entrypoint_bundle_path(entrypoint: &Entrypoint, out_dir: &Path, ext: &str) -> Option<String> {
  let output_dir = Segments::of(&entrypoint.output_dir);
  let relative = output_dir.relative_to(&Segments::of(out_dir))?;

  if relative.is_empty() {
    Some(format!("{}{}", entrypoint.name, ext))
  } else {
    Some(format!("{}/{}{}", relative.join("/"), entrypoint.name, ext))
  }
}

#[cfg(test)]
mod tests {
  use super::entrypoint_bundle_path;
  use crate::models::{Entrypoint, EntrypointKind, PopupOptions};
  use std::path::Path;

  fn popup(output_dir: &str) -> Entrypoint {
    Entrypoint::new(
      "popup",
      "src/entrypoints/popup.html",
      output_dir,
      EntrypointKind::Popup(PopupOptions::default()),
    )
  }

  #[test]
  fn places_root_entrypoints_at_the_top_level() {
    let out_dir = Path::new(".output/chrome-mv3");
    let path = entrypoint_bundle_path(&popup(".output/chrome-mv3"), out_dir, ".html");
    assert_eq!(path.as_deref(), Some("popup.html"));
  }

  #[test]
  fn keeps_nested_output_directories() {
    let out_dir = Path::new(".output/chrome-mv3");
    let path = entrypoint_bundle_path(
      &popup(".output/chrome-mv3/content-scripts"),
      out_dir,
      ".js",
    );
    assert_eq!(path.as_deref(), Some("content-scripts/popup.js"));
  }

  #[test]
  fn normalises_backslashes_from_windows_inputs() {
    let out_dir = Path::new("out");
    let path = entrypoint_bundle_path(&popup("out\\pages\\nested"), out_dir, ".html");
    assert_eq!(path.as_deref(), Some("pages/nested/popup.html"));
  }

  #[test]
  fn resolves_absolute_output_dirs_against_a_relative_out_dir() {
    let out_dir = Path::new(".output/chrome-mv3");

    let root = entrypoint_bundle_path(&popup("/home/u/proj/.output/chrome-mv3"), out_dir, ".html");
    assert_eq!(root.as_deref(), Some("popup.html"));

    let nested = entrypoint_bundle_path(
      &popup("/home/u/proj/.output/chrome-mv3/content-scripts"),
      Path::new("./.output/chrome-mv3/"),
      ".js",
    );
    assert_eq!(nested.as_deref(), Some("content-scripts/popup.js"));
  }

  #[test]
  fn ignores_dot_segments() {
    let out_dir = Path::new("/proj/.output/chrome-mv3");
    let path = entrypoint_bundle_path(
      &popup("/proj/src/../.output/./chrome-mv3/pages"),
      out_dir,
      ".html",
    );
    assert_eq!(path.as_deref(), Some("pages/popup.html"));
  }

  #[test]
  fn rejects_output_dirs_outside_the_out_dir() {
    let out_dir = Path::new(".output/chrome-mv3");
    assert_eq!(entrypoint_bundle_path(&popup("/tmp/elsewhere"), out_dir, ".html"), None);
    assert_eq!(entrypoint_bundle_path(&popup("dist"), out_dir, ".html"), None);
    assert_eq!(
      entrypoint_bundle_path(&popup("dist"), Path::new("/abs/out"), ".html"),
      None
    );
  }
}
