use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static WATCH_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?&]v=([^&]+)").expect("valid regex"));

/// Extracts the video id from a `youtu.be/<id>` link or any URL with a `v=` parameter.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some((_, rest)) = url.rsplit_once("youtu.be/") {
        let id = rest.split('?').next().unwrap_or_default();
        return Some(id.to_string());
    }

    WATCH_PARAM
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Like [`extract_video_id`], but fails with [`Error::InvalidUrl`].
///
/// # Errors
///
/// Returns an error if the URL is empty or has no recognizable id.
pub fn require_video_id(url: &str) -> Result<String> {
    if url.trim().is_empty() {
        return Err(Error::config("No YouTube URL provided"));
    }
    extract_video_id(url)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::invalid_url(url))
}

/// Prefix shared by every file produced for one video.
#[must_use]
pub fn base_name(video_id: &str) -> String {
    format!("youtube_{video_id}")
}

/// Recovers the video id from a base name produced by [`base_name`].
#[must_use]
pub fn video_id_from_base(base: &str) -> &str {
    base.strip_prefix("youtube_").unwrap_or(base)
}
