const SCHEME_SEPARATOR: &str = "://";

/// Replace the path of a match pattern with `*`, keeping its scheme and host.
///
/// Patterns without a scheme separator (such as `<all_urls>`) and patterns without a path are
/// returned unchanged. Applying the function twice gives the same result as applying it once.
pub fn strip_path_from_match_pattern(pattern: &str) -> String {
  let Some(scheme_end) = pattern.find(SCHEME_SEPARATOR) else {
    return pattern.to_string();
  };

  let host_start = scheme_end + SCHEME_SEPARATOR.len();
  match pattern[host_start..].find('/') {
    Some(offset) => format!("{}/*", &pattern[..host_start + offset]),
    None => pattern.to_string(),
  }
}
