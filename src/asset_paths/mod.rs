//! Helpers for turning bundler output locations and match patterns into manifest values.

mod bundle;
mod match_pattern;

pub use bundle::entrypoint_bundle_path;
pub use match_pattern::strip_path_from_match_pattern;
