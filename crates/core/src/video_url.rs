//! YouTube video URL parsing and YouTube Studio deep links.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Length of every YouTube video id.
pub const VIDEO_ID_LENGTH: usize = 11;

/// Recognised URL shapes: `watch?v=`, `/embed/`, `youtu.be/`, `/v/`,
/// `/shorts/` and `/live/`. The id must be followed by the end of input or a
/// non-id character.
const VIDEO_URL_PATTERN: &str = r"^(?:https?://)?(?:(?:www\.|m\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|v/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)";

const BARE_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{11}$";

static VIDEO_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VIDEO_URL_PATTERN).expect("valid regex"));

static BARE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(BARE_ID_PATTERN).expect("valid regex"));

/// Extract the 11-character video id from a YouTube URL or a bare id.
///
/// Returns `None` when the input matches none of the known shapes.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if BARE_ID_RE.is_match(input) {
        return Some(input.to_string());
    }
    VIDEO_URL_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Like [`parse_video_id`] but reports a validation error for unparseable input.
pub fn require_video_id(input: &str) -> Result<String, CoreError> {
    parse_video_id(input).ok_or_else(|| {
        CoreError::Validation(format!(
            "Could not extract a YouTube video id from '{input}'"
        ))
    })
}

/// Build the YouTube Studio comment-moderation link for a video.
///
/// `authuser` selects the signed-in Google account in multi-account browsers.
pub fn studio_comments_url(video_id: &str, authuser: &str) -> String {
    format!("https://studio.youtube.com/video/{video_id}/comments?authuser={authuser}")
}
