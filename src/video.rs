//! Video information as dumped by `yt-dlp --dump-single-json`.

use crate::comment::{CommentRecord, count_from_value};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The subset of yt-dlp's info JSON this crate reads.
///
/// Every field is optional; accessors supply the same fallbacks the generated
/// Markdown uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    /// Video id
    pub id: Option<String>,
    /// Video title
    pub title: Option<String>,
    /// Canonical watch URL
    pub webpage_url: Option<String>,
    /// Channel display name
    pub uploader: Option<String>,
    /// Channel URL
    pub channel_url: Option<String>,
    /// Uploader URL, used when `channel_url` is missing
    pub uploader_url: Option<String>,
    /// Subscriber count
    #[serde(deserialize_with = "lenient_opt_count")]
    pub channel_follower_count: Option<u64>,
    /// Upload date as `YYYYMMDD`
    pub upload_date: Option<String>,
    /// View count
    #[serde(deserialize_with = "lenient_opt_count")]
    pub view_count: Option<u64>,
    /// Like count
    #[serde(deserialize_with = "lenient_opt_count")]
    pub like_count: Option<u64>,
    /// Duration in seconds
    #[serde(deserialize_with = "lenient_opt_count")]
    pub duration: Option<u64>,
    /// Video description
    pub description: Option<String>,
    /// Chapter list, passed through untouched
    #[serde(deserialize_with = "vec_or_default")]
    pub chapters: Vec<Value>,
    /// Flat comment list; only present with `--write-comments`
    #[serde(deserialize_with = "vec_or_default")]
    pub comments: Vec<CommentRecord>,
}

impl VideoInfo {
    /// Title, or `Untitled`.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Description, or `No description`.
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }

    /// Channel link, preferring `channel_url` over `uploader_url`.
    #[must_use]
    pub fn channel_link(&self) -> Option<&str> {
        self.channel_url
            .as_deref()
            .or(self.uploader_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Renders the four-line metadata block.
    ///
    /// `extraction_date` is passed in so the output stays reproducible.
    #[must_use]
    pub fn metadata_markdown(&self, extraction_date: &str) -> String {
        let title = self.title_or_default();
        let link = self.webpage_url.as_deref().unwrap_or("N/A");
        let channel = self.uploader.as_deref().unwrap_or("Unknown");
        let subscribers = format_subscribers(self.channel_follower_count);

        let mut md = format!("- **Title:** [{title}]({link})\n");
        match self.channel_link() {
            Some(url) => md.push_str(&format!("- **Channel:** [{channel}]({url}) ({subscribers})\n")),
            None => md.push_str(&format!("- **Channel:** {channel} ({subscribers})\n")),
        }
        md.push_str(&format!(
            "- **Views:** {} | Likes: {} | Duration: {}\n",
            group_thousands(self.view_count.unwrap_or(0)),
            group_thousands(self.like_count.unwrap_or(0)),
            format_duration(self.duration.unwrap_or(0)),
        ));
        md.push_str(&format!(
            "- **Published:** {} | Extracted: {}\n",
            format_upload_date(self.upload_date.as_deref()),
            extraction_date
        ));
        md
    }

    /// Chapters as pretty-printed JSON (`[]` when there are none).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn chapters_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(&self.chapters)?)
    }
}

/// `YYYYMMDD` to `YYYY-MM-DD`; anything else passes through.
#[must_use]
pub fn format_upload_date(upload_date: Option<&str>) -> String {
    match upload_date {
        Some(d) if d.len() == 8 && d.is_ascii() => format!("{}-{}-{}", &d[..4], &d[4..6], &d[6..]),
        Some(d) => d.to_string(),
        None => "Unknown".to_string(),
    }
}

/// `1234567` to `1,234,567 subscribers`, or `N/A subscribers`.
#[must_use]
pub fn format_subscribers(count: Option<u64>) -> String {
    match count {
        Some(n) => format!("{} subscribers", group_thousands(n)),
        None => "N/A subscribers".to_string(),
    }
}

/// Seconds to `HH:MM:SS`, or `MM:SS` under an hour; `Unknown` for zero.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "Unknown".to_string();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Inserts `,` between groups of three digits.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn lenient_opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| count_from_value(&v)))
}

fn vec_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> VideoInfo {
        serde_json::from_value(json!({
            "id": "abc",
            "title": "Rust in 100 Seconds",
            "webpage_url": "https://www.youtube.com/watch?v=abc",
            "uploader": "Fireship",
            "channel_url": "https://www.youtube.com/@Fireship",
            "channel_follower_count": 3_210_000,
            "upload_date": "20240131",
            "view_count": 1_234_567,
            "like_count": 45_000,
            "duration": 3725,
            "description": "Rust explained",
            "chapters": [{ "title": "Intro", "start_time": 0.0, "end_time": 12.0 }],
            "comments": [
                { "id": "c1", "parent": "root", "author": "@a", "text": "hi", "like_count": 1 }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_full_info() {
        let info = sample();
        assert_eq!(info.title_or_default(), "Rust in 100 Seconds");
        assert_eq!(info.comments.len(), 1);
        assert_eq!(info.chapters.len(), 1);
        assert_eq!(info.duration, Some(3725));
    }

    #[test]
    fn test_metadata_markdown() {
        let md = sample().metadata_markdown("2026-10-19");
        let expected = "\
- **Title:** [Rust in 100 Seconds](https://www.youtube.com/watch?v=abc)\n\
- **Channel:** [Fireship](https://www.youtube.com/@Fireship) (3,210,000 subscribers)\n\
- **Views:** 1,234,567 | Likes: 45,000 | Duration: 01:02:05\n\
- **Published:** 2024-01-31 | Extracted: 2026-10-19\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_metadata_defaults() {
        let info: VideoInfo = serde_json::from_value(json!({ "comments": null })).unwrap();
        let md = info.metadata_markdown("2026-01-01");

        assert!(md.contains("[Untitled](N/A)"));
        assert!(md.contains("- **Channel:** Unknown (N/A subscribers)"));
        assert!(md.contains("Views:** 0 | Likes: 0 | Duration: Unknown"));
        assert!(md.contains("Published:** Unknown"));
        assert!(info.comments.is_empty());
        assert_eq!(info.description_or_default(), "No description");
    }

    #[test]
    fn test_uploader_url_fallback() {
        let info: VideoInfo =
            serde_json::from_value(json!({ "uploader_url": "https://u" })).unwrap();
        assert_eq!(info.channel_link(), Some("https://u"));
    }

    #[test]
    fn test_formatters() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(12_345_678), "12,345,678");
        assert_eq!(format_duration(59), "00:59");
        assert_eq!(format_duration(600), "10:00");
        assert_eq!(format_duration(3600), "01:00:00");
        assert_eq!(format_upload_date(Some("2024")), "2024");
    }

    #[test]
    fn test_chapters_json_empty() {
        assert_eq!(VideoInfo::default().chapters_json().unwrap(), "[]");
    }
}
