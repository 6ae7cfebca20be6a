//! User id extraction from request paths.

use regex::Regex;
use std::sync::OnceLock;

/// Lowercase hyphenated 8-4-4-4-12 hex form.
const CANONICAL_ID: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

fn canonical_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CANONICAL_ID).expect("canonical id pattern is valid"))
}

/// Strip one trailing `/`, if any.
pub fn normalize_path(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// Last segment of the (normalized) path when it is a canonical id, `None` otherwise.
pub fn extract_user_id(path: &str) -> Option<&str> {
    let path = normalize_path(path);
    let segment = path.rsplit('/').next()?;
    canonical_id().is_match(segment).then_some(segment)
}
