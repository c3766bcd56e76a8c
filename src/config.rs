use crate::error::{Error, Result};
use crate::render::{DEFAULT_TOP_LEVEL_CAP, RenderOptions};
use crate::template::DocumentKind;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT_DIR: &str = ".";
const DEFAULT_YTDLP_BINARY: &str = "yt-dlp";
const DEFAULT_SUBTITLE_LANG: &str = "en";

/// Configuration shared by the extraction and finalize steps.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Directory receiving work files and final documents
    pub output_dir: PathBuf,

    /// Number of top-level comments rendered
    pub top_level_cap: usize,

    /// External template replacing the built-in comment document template
    pub comments_template: Option<PathBuf>,

    /// External template replacing the built-in video document template
    pub video_template: Option<PathBuf>,

    /// Keep intermediate work files after finalizing
    pub keep_intermediate: bool,

    /// Back up an existing final document before overwriting it
    pub backup_existing: bool,

    /// Dry run mode (no file writes)
    pub dry_run: bool,

    /// yt-dlp executable name or path
    pub ytdlp_binary: String,

    /// Subtitle language requested from yt-dlp
    pub subtitle_lang: String,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use yt_comments_md::Config;
    ///
    /// let config = Config::builder()
    ///     .top_level_cap(20)
    ///     .build()
    ///     .expect("valid configuration");
    /// assert_eq!(config.top_level_cap, 20);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output path exists but is not a directory
    /// - `top_level_cap` is zero
    /// - The yt-dlp binary or subtitle language is blank
    /// - An external template is missing or invalid
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(Error::config(format!(
                "Output path is not a directory: {}",
                self.output_dir.display()
            )));
        }

        if self.top_level_cap == 0 {
            return Err(Error::config("top_level_cap must be greater than 0"));
        }

        if self.ytdlp_binary.trim().is_empty() {
            return Err(Error::config("yt-dlp binary must not be empty"));
        }

        if self.subtitle_lang.trim().is_empty() {
            return Err(Error::config("subtitle language must not be empty"));
        }

        for (kind, path) in [
            (DocumentKind::Comments, &self.comments_template),
            (DocumentKind::Video, &self.video_template),
        ] {
            if let Some(path) = path {
                crate::template_validator::TemplateValidator::validate_template(path, kind)?;
            }
        }

        Ok(())
    }

    /// Options for the comment renderer.
    #[must_use]
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            top_level_cap: self.top_level_cap,
        }
    }

    /// External template for `kind`, if one is configured.
    #[must_use]
    pub fn template_for(&self, kind: DocumentKind) -> Option<&Path> {
        match kind {
            DocumentKind::Comments => self.comments_template.as_deref(),
            DocumentKind::Video => self.video_template.as_deref(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            top_level_cap: DEFAULT_TOP_LEVEL_CAP,
            comments_template: None,
            video_template: None,
            keep_intermediate: false,
            backup_existing: true,
            dry_run: false,
            ytdlp_binary: DEFAULT_YTDLP_BINARY.to_string(),
            subtitle_lang: DEFAULT_SUBTITLE_LANG.to_string(),
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    output_dir: Option<PathBuf>,
    top_level_cap: Option<usize>,
    comments_template: Option<PathBuf>,
    video_template: Option<PathBuf>,
    keep_intermediate: bool,
    backup_existing: Option<bool>,
    dry_run: bool,
    ytdlp_binary: Option<String>,
    subtitle_lang: Option<String>,
}

impl ConfigBuilder {
    /// Sets the output directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets how many top-level comments are rendered.
    #[must_use]
    pub fn top_level_cap(mut self, cap: usize) -> Self {
        self.top_level_cap = Some(cap);
        self
    }

    /// Sets an external Tera template for the comment document.
    #[must_use]
    pub fn comments_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.comments_template = Some(path.into());
        self
    }

    /// Sets an external Tera template for the video document.
    #[must_use]
    pub fn video_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.video_template = Some(path.into());
        self
    }

    /// Keeps intermediate work files after finalizing.
    #[must_use]
    pub fn keep_intermediate(mut self, enabled: bool) -> Self {
        self.keep_intermediate = enabled;
        self
    }

    /// Enables or disables backup creation.
    #[must_use]
    pub fn backup_existing(mut self, enabled: bool) -> Self {
        self.backup_existing = Some(enabled);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Sets the yt-dlp executable.
    #[must_use]
    pub fn ytdlp_binary(mut self, binary: impl Into<String>) -> Self {
        self.ytdlp_binary = Some(binary.into());
        self
    }

    /// Sets the subtitle language.
    #[must_use]
    pub fn subtitle_lang(mut self, lang: impl Into<String>) -> Self {
        self.subtitle_lang = Some(lang.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            top_level_cap: self.top_level_cap.unwrap_or(DEFAULT_TOP_LEVEL_CAP),
            comments_template: self.comments_template,
            video_template: self.video_template,
            keep_intermediate: self.keep_intermediate,
            backup_existing: self.backup_existing.unwrap_or(true),
            dry_run: self.dry_run,
            ytdlp_binary: self
                .ytdlp_binary
                .unwrap_or_else(|| DEFAULT_YTDLP_BINARY.to_string()),
            subtitle_lang: self
                .subtitle_lang
                .unwrap_or_else(|| DEFAULT_SUBTITLE_LANG.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}
