use crate::{
    config::Config,
    error::{Error, Result},
    template::DocumentKind,
    url::video_id_from_base,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, info};

static INVALID_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Maximum title length kept in final filenames.
pub const MAX_TITLE_LEN: usize = 60;

/// Intermediate files exchanged between steps, named `{base}{suffix}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkFile {
    /// Video title (comment flow)
    Name,
    /// Rendered comment threads
    Comments,
    /// Comment threads after review
    CommentsCleaned,
    /// Curated comment highlights
    CommentGold,
    /// Video title (video flow)
    Title,
    /// Metadata bullet block
    Metadata,
    /// Reviewer summary
    Summary,
    /// Video description
    Description,
    /// Chapter list
    Chapters,
    /// Raw captions
    TranscriptVtt,
    /// De-duplicated, timestamped captions
    TranscriptDedup,
    /// Captions without timestamps
    TranscriptPlain,
    /// Captions grouped into paragraphs
    TranscriptParagraphs,
    /// Paragraphs after review
    TranscriptCleaned,
    /// Final transcript
    Transcript,
    /// Extracted audio for speech-to-text
    Audio,
}

impl WorkFile {
    /// Suffix appended to the base name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Name => "_name.txt",
            Self::Comments => "_comments.md",
            Self::CommentsCleaned => "_comments_cleaned.md",
            Self::CommentGold => "_comment_gold.md",
            Self::Title => "_title.txt",
            Self::Metadata => "_metadata.md",
            Self::Summary => "_summary.md",
            Self::Description => "_description.md",
            Self::Chapters => "_chapters.json",
            Self::TranscriptVtt => "_transcript.vtt",
            Self::TranscriptDedup => "_transcript_dedup.md",
            Self::TranscriptPlain => "_transcript_no_timestamps.txt",
            Self::TranscriptParagraphs => "_transcript_paragraphs.md",
            Self::TranscriptCleaned => "_transcript_cleaned.md",
            Self::Transcript => "_transcript.md",
            Self::Audio => "_audio.mp3",
        }
    }

    /// Work files removed after finalizing a document of `kind`.
    #[must_use]
    pub const fn intermediates(kind: DocumentKind) -> &'static [Self] {
        match kind {
            DocumentKind::Comments => &[
                Self::Name,
                Self::Comments,
                Self::CommentsCleaned,
                Self::CommentGold,
            ],
            DocumentKind::Video => &[
                Self::Title,
                Self::Metadata,
                Self::Summary,
                Self::Description,
                Self::Chapters,
                Self::TranscriptVtt,
                Self::TranscriptDedup,
                Self::TranscriptPlain,
                Self::TranscriptParagraphs,
                Self::TranscriptCleaned,
                Self::Transcript,
            ],
        }
    }
}

/// Strips characters that are invalid in filenames, collapses whitespace and
/// cuts long titles at a word boundary.
#[must_use]
pub fn clean_title_for_filename(title: &str, max_len: usize) -> String {
    let cleaned = INVALID_FILENAME_CHARS.replace_all(title, "");
    let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_len {
        return cleaned.to_string();
    }

    let truncated: String = cleaned.chars().take(max_len).collect();
    match truncated.rsplit_once(' ') {
        Some((head, _)) => head.to_string(),
        None => truncated,
    }
}

/// Human-readable name of the final document.
///
/// Falls back to a base-name derived filename when the title is blank.
#[must_use]
pub fn final_filename(kind: DocumentKind, base: &str, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return match kind {
            DocumentKind::Comments => format!("{base}_comment_analysis.md"),
            DocumentKind::Video => format!("{base}.md"),
        };
    }

    let cleaned = clean_title_for_filename(title, MAX_TITLE_LEN);
    let video_id = video_id_from_base(base);
    match kind {
        DocumentKind::Comments => format!("youtube - {cleaned} - comments ({video_id}).md"),
        DocumentKind::Video => format!("youtube - {cleaned} ({video_id}).md"),
    }
}

/// Reads and writes files in the output directory.
pub(crate) struct Writer {
    output_dir: PathBuf,
    backup_existing: bool,
    dry_run: bool,
}

impl Writer {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            backup_existing: config.backup_existing,
            dry_run: config.dry_run,
        }
    }

    /// Path of a work file for `base`.
    pub(crate) fn work_path(&self, base: &str, file: WorkFile) -> PathBuf {
        self.output_dir.join(format!("{base}{}", file.suffix()))
    }

    /// Creates the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub(crate) fn ensure_output_dir(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        fs::create_dir_all(&self.output_dir).map_err(|e| Error::io(&self.output_dir, e))
    }

    /// Writes a work file, returning its path. Nothing is written in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub(crate) fn write_work_file(&self, base: &str, file: WorkFile, content: &str) -> Result<PathBuf> {
        let path = self.work_path(base, file);
        if self.dry_run {
            debug!("Dry run: skipping {}", path.display());
            return Ok(path);
        }

        fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Reads a work file, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub(crate) fn read_work_file(&self, base: &str, file: WorkFile) -> Result<String> {
        let path = self.work_path(base, file);
        if !path.exists() {
            debug!("{} not found, using empty content", path.display());
            return Ok(String::new());
        }
        fs::read_to_string(&path).map_err(|e| Error::io(&path, e))
    }

    /// Writes `content` to an arbitrary path. Nothing is written in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub(crate) fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if self.dry_run {
            debug!("Dry run: skipping {}", path.display());
            return Ok(());
        }

        fs::write(path, content).map_err(|e| Error::io(path, e))?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Writes the final document atomically, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the write fails.
    pub(crate) fn write_final(&self, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(filename);
        if self.dry_run {
            debug!("Dry run: skipping {}", path.display());
            return Ok(path);
        }

        self.write_file_atomic(&path, content)?;
        info!("Created final file: {}", filename);
        Ok(path)
    }

    /// Removes the intermediate files of a finalized document.
    ///
    /// Returns the number of files removed.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub(crate) fn remove_intermediates(&self, base: &str, kind: DocumentKind) -> Result<usize> {
        if self.dry_run {
            return Ok(0);
        }

        let mut removed = 0;
        for file in WorkFile::intermediates(kind) {
            let path = self.work_path(base, *file);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                debug!("Removed {}", path.display());
                removed += 1;
            }
        }

        info!("Cleaned up {} intermediate work files", removed);
        Ok(removed)
    }

    /// Writes a file atomically with optional backup.
    ///
    /// # Process
    ///
    /// 1. Creates backup if file exists and backup is enabled
    /// 2. Writes content to temporary file
    /// 3. Syncs temporary file to disk
    /// 4. Atomically renames temporary file to target path
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if path.exists() && self.backup_existing {
            self.backup_file(path)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

        drop(temp_file);

        fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

        Ok(())
    }

    /// Creates a timestamped backup of an existing file.
    fn backup_file(&self, path: &Path) -> Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        let filename = path
            .file_name()
            .ok_or_else(|| Error::config("Invalid file path"))?
            .to_string_lossy();

        let backup_path = self
            .output_dir
            .join(format!("{filename}.backup.{timestamp}"));

        fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(())
    }
}
