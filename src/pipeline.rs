use crate::{
    config::Config,
    error::{Error, Result},
    render::{DepthBoundedRenderer, RenderedDocument},
    template::{CommentsDocument, DocumentKind, TemplateEngine, VideoDocument},
    thread::ThreadBuilder,
    transcript,
    url::{base_name, require_video_id},
    whisper::{WhisperQuality, WhisperTools},
    writer::{WorkFile, Writer, final_filename},
    ytdlp::{InfoSource, JsonFileSource, SubtitleKind, YtDlp},
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tracing::{info, instrument, warn};

/// Statistics collected while extracting comments.
#[derive(Debug, Clone, Serialize)]
pub struct CommentStats {
    /// Base name of the work files (`youtube_{id}`)
    pub base_name: String,

    /// Video title
    pub title: String,

    /// Comments without a parent
    pub top_level_comments: usize,

    /// Replies (all records that are not top-level)
    pub replies: usize,

    /// Top-level threads present in the rendered output
    pub rendered_threads: usize,

    /// Number of files written
    pub files_written: usize,

    /// Output directory path
    pub output_directory: String,

    /// Time spent fetching
    pub fetch_duration: Duration,

    /// Time spent building and rendering threads
    pub render_duration: Duration,

    /// Total execution time
    pub duration: Duration,
}

impl CommentStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Comment Extraction Summary                 ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!("║ Video: {}", self.title);
        println!(
            "║ Top-level comments:   {:>8}                        ║",
            self.top_level_comments
        );
        println!(
            "║ Replies:              {:>8}                        ║",
            self.replies
        );
        println!(
            "║ Threads rendered:     {:>8}                        ║",
            self.rendered_threads
        );
        println!("║                                                       ║");
        println!(
            "║ Files Written:        {:>8}                        ║",
            self.files_written
        );
        println!("║ Output Directory:                                     ║");
        println!("║   {}", self.output_directory);
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Fetching:         {:>8.2}s                     ║",
            self.fetch_duration.as_secs_f64()
        );
        println!(
            "║   - Rendering:        {:>8.2}s                     ║",
            self.render_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Fetches a video's comments and renders them as nested Markdown.
pub struct CommentsPipeline {
    config: Config,
    source: Box<dyn InfoSource>,
    renderer: DepthBoundedRenderer,
    writer: Writer,
}

impl CommentsPipeline {
    /// Creates a pipeline that fetches comments with yt-dlp.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or yt-dlp is not installed.
    pub fn new(config: Config) -> Result<Self> {
        let ytdlp = YtDlp::new(config.ytdlp_binary.clone()).with_comments(true);
        ytdlp.check_installed()?;
        Self::with_source(config, ytdlp)
    }

    /// Creates a pipeline reading video information from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_source(config: Config, source: impl InfoSource + 'static) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            renderer: DepthBoundedRenderer::new(config.render_options()),
            writer: Writer::new(&config),
            source: Box::new(source),
            config,
        })
    }

    /// Writes `{base}_name.txt` and `{base}_comments.md` for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no video id, fetching fails, or a file
    /// cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use yt_comments_md::{CommentsPipeline, Config};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder().output_dir("./notes").build()?;
    ///
    /// let stats = CommentsPipeline::new(config)?.run("https://youtu.be/dQw4w9WgXcQ")?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(output_dir = %self.config.output_dir.display()))]
    pub fn run(&self, url: &str) -> Result<CommentStats> {
        let start_time = Instant::now();

        let video_id = require_video_id(url)?;
        let base = base_name(&video_id);
        self.writer.ensure_output_dir()?;

        info!("Stage 1/2: Fetching video data...");
        let fetch_start = Instant::now();
        let info = self.source.fetch(url)?;
        let fetch_duration = fetch_start.elapsed();

        let title = info.title_or_default().to_string();
        self.writer.write_work_file(&base, WorkFile::Name, &title)?;

        info!("Stage 2/2: Rendering comment threads...");
        let render_start = Instant::now();
        let forest = ThreadBuilder::build(&info.comments);
        let document = self.renderer.render(&forest);
        let render_duration = render_start.elapsed();

        self.writer
            .write_work_file(&base, WorkFile::Comments, &document.to_markdown())?;

        info!(
            "✓ Rendered {} of {} top-level comments ({} replies)",
            document.top_level_blocks(),
            forest.top_level_count(),
            forest.reply_count()
        );

        let files_written = if self.config.dry_run {
            warn!("Dry run mode enabled - no files were written");
            0
        } else {
            2
        };

        Ok(CommentStats {
            base_name: base,
            title,
            top_level_comments: forest.top_level_count(),
            replies: forest.reply_count(),
            rendered_threads: document.top_level_blocks(),
            files_written,
            output_directory: self.config.output_dir.display().to_string(),
            fetch_duration,
            render_duration,
            duration: start_time.elapsed(),
        })
    }
}

/// Files produced by [`VideoPipeline::run`].
#[derive(Debug, Clone, Serialize)]
pub struct VideoOutput {
    /// Base name of the work files (`youtube_{id}`)
    pub base_name: String,

    /// Video title
    pub title: String,

    /// Number of chapters in the video
    pub chapters: usize,

    /// Paths of the work files
    pub files: Vec<PathBuf>,
}

/// Fetches video metadata and captions into work files.
pub struct VideoPipeline {
    config: Config,
    source: Box<dyn InfoSource>,
    ytdlp: YtDlp,
    whisper: WhisperTools,
    writer: Writer,
}

/// Files produced by [`VideoPipeline::transcribe`].
#[derive(Debug, Clone, Serialize)]
pub struct Transcription {
    /// Whisper output renamed to `{base}_transcript.vtt`
    pub vtt: PathBuf,

    /// Extracted audio, left in place for the caller to delete
    pub audio: PathBuf,
}

impl VideoPipeline {
    /// Creates a pipeline that fetches with yt-dlp.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or yt-dlp is not installed.
    pub fn new(config: Config) -> Result<Self> {
        let ytdlp = YtDlp::new(config.ytdlp_binary.clone());
        ytdlp.check_installed()?;
        Self::with_source(config, ytdlp)
    }

    /// Creates a pipeline reading video information from `source`.
    ///
    /// Subtitles are still downloaded with the configured yt-dlp binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_source(config: Config, source: impl InfoSource + 'static) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ytdlp: YtDlp::new(config.ytdlp_binary.clone()),
            whisper: WhisperTools::default(),
            writer: Writer::new(&config),
            source: Box::new(source),
            config,
        })
    }

    /// Uses other Whisper executables for [`VideoPipeline::transcribe`].
    #[must_use]
    pub fn with_whisper_tools(mut self, tools: WhisperTools) -> Self {
        self.whisper = tools;
        self
    }

    /// Writes the metadata, title, description and chapter work files for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no video id, fetching fails, or a file
    /// cannot be written.
    #[instrument(skip(self), fields(output_dir = %self.config.output_dir.display()))]
    pub fn run(&self, url: &str) -> Result<VideoOutput> {
        let video_id = require_video_id(url)?;
        let base = base_name(&video_id);
        self.writer.ensure_output_dir()?;

        let info = self.source.fetch(url)?;
        let extraction_date = chrono::Local::now().format("%Y-%m-%d").to_string();

        let files = vec![
            self.writer.write_work_file(
                &base,
                WorkFile::Metadata,
                &info.metadata_markdown(&extraction_date),
            )?,
            self.writer
                .write_work_file(&base, WorkFile::Title, info.title_or_default())?,
            self.writer.write_work_file(
                &base,
                WorkFile::Description,
                info.description_or_default(),
            )?,
            self.writer
                .write_work_file(&base, WorkFile::Chapters, &info.chapters_json()?)?,
        ];

        if info.chapters.is_empty() {
            info!("No chapters in video");
        } else {
            info!("Found {} chapters", info.chapters.len());
        }

        Ok(VideoOutput {
            base_name: base,
            title: info.title_or_default().to_string(),
            chapters: info.chapters.len(),
            files,
        })
    }

    /// Downloads captions to `{base}_transcript.vtt`, manual before auto-generated.
    ///
    /// Returns `None` when the video has no captions in the configured language.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no video id, yt-dlp cannot be run, or the
    /// downloaded file cannot be moved into place.
    #[instrument(skip(self))]
    pub fn download_subtitles(&self, url: &str) -> Result<Option<(SubtitleKind, PathBuf)>> {
        let video_id = require_video_id(url)?;
        let base = base_name(&video_id);

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping subtitle download");
            return Ok(None);
        }
        self.writer.ensure_output_dir()?;

        let language = self.ytdlp.video_language(url);
        info!("Video language: {}", language);

        let stem = self
            .config
            .output_dir
            .join(format!("{base}_transcript_temp"));
        let Some((kind, temp_file)) =
            self.ytdlp
                .download_subtitles(url, &self.config.subtitle_lang, &stem)?
        else {
            warn!("No subtitles available in '{}'", self.config.subtitle_lang);
            return Ok(None);
        };

        let final_path = self.writer.work_path(&base, WorkFile::TranscriptVtt);
        fs::rename(&temp_file, &final_path).map_err(|e| Error::io(&final_path, e))?;
        info!("Wrote {}", final_path.display());

        Ok(Some((kind, final_path)))
    }

    /// Transcribes the audio track with Whisper into `{base}_transcript.vtt`.
    ///
    /// For videos without captions. The audio is kept as `{base}_audio.mp3` on
    /// success and removed when transcription fails. Returns `None` in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no video id, no Whisper is installed, or
    /// downloading or transcribing fails.
    #[instrument(skip(self))]
    pub fn transcribe(&self, url: &str, quality: WhisperQuality) -> Result<Option<Transcription>> {
        let video_id = require_video_id(url)?;
        let base = base_name(&video_id);
        let whisper = self.whisper.detect()?;
        info!("Using {:?} Whisper", whisper.backend());

        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping transcription");
            return Ok(None);
        }
        self.writer.ensure_output_dir()?;

        if let Some(size) = self.ytdlp.audio_size(url) {
            info!("Audio size and duration: {}", size);
        }
        info!("Video language: {}", self.ytdlp.video_language(url));

        let audio = self.writer.work_path(&base, WorkFile::Audio);
        self.ytdlp.download_audio(url, &audio)?;

        let vtt = match whisper.transcribe(&audio, &self.config.output_dir, quality) {
            Ok(vtt) => vtt,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&audio) {
                    warn!("Could not remove {}: {}", audio.display(), cleanup);
                }
                return Err(e);
            }
        };

        let final_path = self.writer.work_path(&base, WorkFile::TranscriptVtt);
        fs::rename(&vtt, &final_path).map_err(|e| Error::io(&final_path, e))?;
        info!("Wrote {} (audio kept at {})", final_path.display(), audio.display());

        Ok(Some(Transcription {
            vtt: final_path,
            audio,
        }))
    }
}

/// Assembles final documents from work files.
pub struct Finalizer {
    config: Config,
    templates: TemplateEngine,
    writer: Writer,
}

impl Finalizer {
    /// Creates a finalizer with the configured templates.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a template fails to
    /// compile.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            templates: TemplateEngine::new(&config)?,
            writer: Writer::new(&config),
            config,
        })
    }

    /// Writes the comment document for `base`, returning its path.
    ///
    /// Reads `_name.txt`, `_comment_gold.md` and `_comments_cleaned.md`; missing
    /// files count as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a work file cannot be read, rendering fails, or the
    /// final file cannot be written.
    #[instrument(skip(self))]
    pub fn finalize_comments(&self, base: &str) -> Result<PathBuf> {
        let document = CommentsDocument {
            video_name: self.writer.read_work_file(base, WorkFile::Name)?,
            comment_gold: self.writer.read_work_file(base, WorkFile::CommentGold)?,
            comments: self.writer.read_work_file(base, WorkFile::CommentsCleaned)?,
        };

        let content = self.templates.render_comments(&document)?;
        let filename = final_filename(DocumentKind::Comments, base, &document.video_name);
        self.finish(base, DocumentKind::Comments, &filename, &content)
    }

    /// Writes the video document for `base`, returning its path.
    ///
    /// Reads `_metadata.md`, `_summary.md`, `_description.md`, `_transcript.md`
    /// and takes the filename from `_title.txt`; missing files count as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a work file cannot be read, rendering fails, or the
    /// final file cannot be written.
    #[instrument(skip(self))]
    pub fn finalize_video(&self, base: &str) -> Result<PathBuf> {
        let document = VideoDocument {
            metadata: self.writer.read_work_file(base, WorkFile::Metadata)?,
            summary: self.writer.read_work_file(base, WorkFile::Summary)?,
            description: self.writer.read_work_file(base, WorkFile::Description)?,
            transcription: self.writer.read_work_file(base, WorkFile::Transcript)?,
        };
        let title = self.writer.read_work_file(base, WorkFile::Title)?;

        let content = self.templates.render_video(&document)?;
        let filename = final_filename(DocumentKind::Video, base, &title);
        self.finish(base, DocumentKind::Video, &filename, &content)
    }

    fn finish(&self, base: &str, kind: DocumentKind, filename: &str, content: &str) -> Result<PathBuf> {
        let path = self.writer.write_final(filename, content)?;

        if self.config.keep_intermediate {
            info!("Debug mode: keeping intermediate work files");
        } else {
            self.writer.remove_intermediates(base, kind)?;
        }

        Ok(path)
    }
}

/// Renders the comments of a saved yt-dlp info JSON file, writing them to
/// `output` when given.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the file cannot be read or
/// parsed, or the output cannot be written.
pub fn render_info_file(
    config: &Config,
    info_json: &Path,
    output: Option<&Path>,
) -> Result<RenderedDocument> {
    config.validate()?;

    let info = JsonFileSource::new(info_json).fetch("")?;
    let forest = ThreadBuilder::build(&info.comments);
    let document = DepthBoundedRenderer::new(config.render_options()).render(&forest);

    if let Some(path) = output {
        Writer::new(config).write_file(path, &document.to_markdown())?;
    }
    Ok(document)
}

/// De-duplicates a VTT file into `[start] text` lines, returning the line count.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, or no captions remain.
pub fn deduplicate_vtt_file(config: &Config, input: &Path, output: &Path) -> Result<usize> {
    let raw = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let lines = transcript::deduplicate_vtt(&raw, &input.display().to_string())?;

    Writer::new(config).write_file(output, &lines.join("\n"))?;
    Ok(lines.len())
}

/// Groups a de-duplicated transcript into paragraphs, returning the paragraph count.
///
/// # Errors
///
/// Returns an error if the break list is invalid, a file cannot be read or
/// written, or no paragraph could be built.
pub fn paragraph_file(config: &Config, input: &Path, output: &Path, breaks: &str) -> Result<usize> {
    let breaks = transcript::parse_breaks(breaks)?;
    let raw = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let paragraphs =
        transcript::apply_paragraph_breaks(&raw, &breaks, &input.display().to_string())?;

    Writer::new(config).write_file(output, &transcript::paragraphs_markdown(&paragraphs))?;
    Ok(paragraphs.len())
}
