//! Syntax checks for YouTube comment ids.
//!
//! Top-level comment ids start with `Ug` followed by URL-safe base64
//! characters. Reply ids append `.<suffix>` to their parent's id.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix shared by every YouTube comment id.
pub const COMMENT_ID_PREFIX: &str = "Ug";

const COMMENT_ID_PATTERN: &str = r"^Ug[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)?$";

static COMMENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(COMMENT_ID_PATTERN).expect("valid regex"));

/// Whether `id` is a syntactically valid comment or reply id.
pub fn is_valid_comment_id(id: &str) -> bool {
    COMMENT_ID_RE.is_match(id)
}

/// Whether `id` is a valid top-level (non-reply) comment id.
pub fn is_top_level_comment_id(id: &str) -> bool {
    is_valid_comment_id(id) && !id.contains('.')
}
