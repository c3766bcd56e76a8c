//! Obtaining [`VideoInfo`] from yt-dlp or from a saved info JSON file.

use crate::error::{Error, Result};
use crate::video::VideoInfo;
use globset::GlobBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info, instrument};

const INSTALL_HINT: &str = "Install options:
  - macOS: brew install yt-dlp
  - Ubuntu/Debian: sudo apt update && sudo apt install -y yt-dlp
  - All systems: pip3 install yt-dlp";

/// Anything that can produce video information for a URL.
pub trait InfoSource {
    /// Fetches information (and comments, if the source provides them) for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the information cannot be obtained or parsed.
    fn fetch(&self, url: &str) -> Result<VideoInfo>;
}

/// Subtitle flavour requested from YouTube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleKind {
    /// Uploaded by the channel
    Manual,
    /// Generated by speech recognition
    Auto,
}

impl SubtitleKind {
    const fn flag(self) -> &'static str {
        match self {
            Self::Manual => "--write-sub",
            Self::Auto => "--write-auto-sub",
        }
    }
}

/// Runs the yt-dlp executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
    with_comments: bool,
}

impl YtDlp {
    /// Creates a runner for the given executable.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            with_comments: false,
        }
    }

    /// Also request the comment list when fetching.
    #[must_use]
    pub const fn with_comments(mut self, enabled: bool) -> Self {
        self.with_comments = enabled;
        self
    }

    /// Checks that yt-dlp runs, returning its version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolMissing`] if the executable cannot be run.
    pub fn check_installed(&self) -> Result<String> {
        match Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                debug!("Found {} {}", self.binary, version);
                Ok(version)
            }
            _ => Err(Error::tool_missing(&self.binary, INSTALL_HINT)),
        }
    }

    /// Spoken language of the video, or `unknown`.
    #[must_use]
    pub fn video_language(&self, url: &str) -> String {
        match self.run(&["--print", "%(language)s", url]) {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            _ => "unknown".to_string(),
        }
    }

    /// Downloads subtitles next to `output_stem`, trying manual ones before
    /// auto-generated ones. Returns the `.vtt` file yt-dlp wrote, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if yt-dlp cannot be started or the output directory
    /// cannot be listed.
    #[instrument(skip(self, output_stem), fields(stem = %output_stem.display()))]
    pub fn download_subtitles(
        &self,
        url: &str,
        lang: &str,
        output_stem: &Path,
    ) -> Result<Option<(SubtitleKind, PathBuf)>> {
        let stem = output_stem.to_string_lossy().into_owned();

        for kind in [SubtitleKind::Manual, SubtitleKind::Auto] {
            self.run(&[
                kind.flag(),
                "--sub-langs",
                lang,
                "--skip-download",
                "--output",
                stem.as_str(),
                url,
            ])?;

            if let Some(path) = find_subtitle_file(output_stem)? {
                info!("{:?} subtitles downloaded ({})", kind, lang);
                return Ok(Some((kind, path)));
            }
            debug!("No {:?} subtitles for {}", kind, lang);
        }

        Ok(None)
    }

    /// Approximate audio size and duration as printed by yt-dlp, if available.
    #[must_use]
    pub fn audio_size(&self, url: &str) -> Option<String> {
        match self.run(&["--print", "%(filesize,filesize_approx)s %(duration)s", url]) {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            _ => None,
        }
    }

    /// Extracts the audio track as MP3 into `audio_file`.
    ///
    /// # Errors
    ///
    /// Returns an error if yt-dlp fails or does not produce the file.
    #[instrument(skip(self, audio_file), fields(audio = %audio_file.display()))]
    pub fn download_audio(&self, url: &str, audio_file: &Path) -> Result<()> {
        let target = audio_file.to_string_lossy().into_owned();
        let args = ["-x", "--audio-format", "mp3", "--output", target.as_str(), url];

        let output = self.run(&args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command(self.command_line(&args), stderr.trim()));
        }
        if !audio_file.exists() {
            return Err(Error::command(self.command_line(&args), "Audio file not found"));
        }

        info!("Downloaded audio to {}", audio_file.display());
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("Running {} {}", self.binary, args.join(" "));
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| Error::command(self.command_line(args), e.to_string()))
    }

    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl InfoSource for YtDlp {
    #[instrument(skip(self))]
    fn fetch(&self, url: &str) -> Result<VideoInfo> {
        let mut args = vec!["--dump-single-json"];
        if self.with_comments {
            args.push("--write-comments");
        }
        args.extend(["--skip-download", url]);

        let output = self.run(&args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command(self.command_line(&args), stderr.trim()));
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        info!(
            "Fetched '{}' ({} comments)",
            info.title_or_default(),
            info.comments.len()
        );
        Ok(info)
    }
}

/// Reads a JSON file previously written by `yt-dlp --dump-single-json`.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InfoSource for JsonFileSource {
    fn fetch(&self, _url: &str) -> Result<VideoInfo> {
        let raw = fs::read(&self.path).map_err(|e| Error::io(&self.path, e))?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// First `<stem>.*.vtt` file next to `output_stem`, in name order.
fn find_subtitle_file(output_stem: &Path) -> Result<Option<PathBuf>> {
    let dir = match output_stem.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(stem) = output_stem.file_name().map(|n| n.to_string_lossy().to_string()) else {
        return Ok(None);
    };

    let matcher = GlobBuilder::new(&format!("{}.*.vtt", globset::escape(&stem)))
        .literal_separator(true)
        .build()
        .map_err(|e| Error::config(format!("Invalid subtitle pattern: {e}")))?
        .compile_matcher();

    if !dir.exists() {
        return Ok(None);
    }

    let mut matches: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(|e| Error::io(&dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(|entry| entry.path())
        .collect();
    matches.sort();

    Ok(matches.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_json_file_source() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("info.json");
        file.write_str(
            r#"{"title": "T", "comments": [
                {"id": "a", "parent": "root", "author": "A", "text": "x", "like_count": 2},
                {"id": "b", "parent": "a", "text": "y"}
            ]}"#,
        )
        .unwrap();

        let info = JsonFileSource::new(file.path()).fetch("ignored").unwrap();
        assert_eq!(info.title_or_default(), "T");
        assert_eq!(info.comments.len(), 2);
        assert_eq!(info.comments[1].author_or_placeholder(), "Unknown");
    }

    #[test]
    fn test_json_file_source_missing_file() {
        let err = JsonFileSource::new("/nonexistent/info.json")
            .fetch("")
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_json_file_source_bad_json() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("info.json");
        file.write_str("not json").unwrap();

        let err = JsonFileSource::new(file.path()).fetch("").unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_missing_binary_reports_tool_missing() {
        let err = YtDlp::new("definitely-not-a-real-yt-dlp-binary")
            .check_installed()
            .unwrap_err();
        assert!(err.is_tool_missing());
        assert!(err.to_string().contains("pip3 install yt-dlp"));
    }

    #[test]
    fn test_missing_binary_fetch_fails() {
        let err = YtDlp::new("definitely-not-a-real-yt-dlp-binary")
            .fetch("https://youtu.be/abc")
            .unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }

    #[test]
    fn test_missing_binary_audio_download_fails() {
        let temp = assert_fs::TempDir::new().unwrap();
        let ytdlp = YtDlp::new("definitely-not-a-real-yt-dlp-binary");

        let err = ytdlp
            .download_audio("https://youtu.be/abc", &temp.path().join("a.mp3"))
            .unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
        assert_eq!(ytdlp.audio_size("https://youtu.be/abc"), None);
    }

    #[test]
    fn test_find_subtitle_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("youtube_abc.en.vtt").write_str("WEBVTT").unwrap();
        temp.child("youtube_abc.vtt").write_str("WEBVTT").unwrap();
        temp.child("youtube_xyz.en.vtt").write_str("WEBVTT").unwrap();

        let found = find_subtitle_file(&temp.path().join("youtube_abc")).unwrap();
        assert_eq!(found, Some(temp.path().join("youtube_abc.en.vtt")));

        let none = find_subtitle_file(&temp.path().join("youtube_nope")).unwrap();
        assert_eq!(none, None);
    }
}
