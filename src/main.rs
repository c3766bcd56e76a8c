use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use yt_comments_md::{
    CommentsPipeline, Config, Finalizer, VideoPipeline, WhisperQuality, deduplicate_vtt_file,
    paragraph_file, render_info_file,
};

#[derive(Parser, Debug)]
#[command(
    name = "yt-comments-md",
    version,
    author,
    about = "Turn YouTube comments, metadata and captions into Markdown notes",
    long_about = "Turn YouTube comments, metadata and captions into Markdown notes.\n\n\
    Extraction commands write intermediate work files named youtube_{VIDEO_ID}_*; \
    finalize commands assemble them into one document with a human-readable name.\n\n\
    USAGE EXAMPLES:\n  \
      # Render comment threads for a video\n  \
      yt-comments-md comments 'https://www.youtube.com/watch?v=dQw4w9WgXcQ' ./notes\n\n  \
      # Render from a saved `yt-dlp --dump-single-json --write-comments` file\n  \
      yt-comments-md render info.json --out comments.md\n\n  \
      # Assemble the final comment document, keeping work files\n  \
      yt-comments-md --debug finalize-comments youtube_dQw4w9WgXcQ ./notes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of top-level comments rendered
    #[arg(long, global = true, default_value_t = yt_comments_md::DEFAULT_TOP_LEVEL_CAP)]
    top_level_cap: usize,

    /// Path to a custom Tera template for the finalized document
    #[arg(long, global = true, value_name = "FILE")]
    template: Option<PathBuf>,

    /// yt-dlp executable
    #[arg(long = "yt-dlp", global = true, env = "YT_DLP", default_value = "yt-dlp")]
    ytdlp: String,

    /// Subtitle language
    #[arg(long, global = true, default_value = "en")]
    lang: String,

    /// Keep intermediate work files after finalizing
    #[arg(long, global = true)]
    debug: bool,

    /// Overwrite final documents without a backup
    #[arg(long, global = true)]
    no_backup: bool,

    /// Dry run (don't write files)
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch comments and write {base}_name.txt and {base}_comments.md
    Comments {
        /// YouTube video URL
        url: String,
        /// Output directory
        #[arg(default_value = ".")]
        out: PathBuf,
    },

    /// Fetch metadata, description and chapters into work files
    Video {
        /// YouTube video URL
        url: String,
        /// Output directory
        #[arg(default_value = ".")]
        out: PathBuf,
    },

    /// Download captions to {base}_transcript.vtt
    Subtitles {
        /// YouTube video URL
        url: String,
        /// Output directory
        #[arg(default_value = ".")]
        out: PathBuf,
    },

    /// Transcribe the audio with Whisper when no captions exist
    Transcribe {
        /// YouTube video URL
        url: String,
        /// Output directory
        #[arg(default_value = ".")]
        out: PathBuf,
        /// Use the medium model (~5GB download)
        #[arg(long, conflicts_with = "hq")]
        mq: bool,
        /// Use the large model (~10GB download, slower)
        #[arg(long)]
        hq: bool,
    },

    /// Render comment threads from a saved yt-dlp info JSON file
    Render {
        /// File written by `yt-dlp --dump-single-json --write-comments`
        info_json: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Assemble the comment document from its work files
    FinalizeComments {
        /// Base name of the work files (youtube_{VIDEO_ID})
        base: String,
        /// Output directory holding the work files
        #[arg(default_value = ".")]
        out: PathBuf,
    },

    /// Assemble the video document from its work files
    Finalize {
        /// Base name of the work files (youtube_{VIDEO_ID})
        base: String,
        /// Output directory holding the work files
        #[arg(default_value = ".")]
        out: PathBuf,
    },

    /// Collapse repeated VTT caption lines into `[start] text` lines
    DedupVtt {
        /// Input VTT file
        input: PathBuf,
        /// Output file
        output: PathBuf,
    },

    /// Join timestamped lines into paragraphs at the given line numbers
    Paragraphs {
        /// De-duplicated transcript
        input: PathBuf,
        /// Output file
        output: PathBuf,
        /// Comma-separated 1-based line numbers closing a paragraph, e.g. "15,42,78"
        breaks: String,
    },
}

enum TemplateTarget {
    None,
    Comments,
    Video,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    match &cli.command {
        Command::Comments { url, out } => {
            let config = build_config(&cli, out.clone(), TemplateTarget::None)?;
            let stats = CommentsPipeline::new(config)
                .context("Failed to create comments pipeline")?
                .run(url)
                .context("Comment extraction failed")?;
            stats.print_summary();
        }
        Command::Video { url, out } => {
            let config = build_config(&cli, out.clone(), TemplateTarget::None)?;
            let output = VideoPipeline::new(config)
                .context("Failed to create video pipeline")?
                .run(url)
                .context("Video extraction failed")?;
            for file in &output.files {
                println!("SUCCESS: {}", file.display());
            }
        }
        Command::Subtitles { url, out } => {
            let config = build_config(&cli, out.clone(), TemplateTarget::None)?;
            let downloaded = VideoPipeline::new(config)
                .context("Failed to create video pipeline")?
                .download_subtitles(url)
                .context("Subtitle download failed")?;
            match downloaded {
                Some((_, path)) => println!("SUCCESS: {}", path.display()),
                None => anyhow::bail!("No subtitles available in '{}'", cli.lang),
            }
        }
        Command::Transcribe { url, out, mq, hq } => {
            let quality = match (mq, hq) {
                (_, true) => WhisperQuality::High,
                (true, false) => WhisperQuality::Medium,
                (false, false) => WhisperQuality::Default,
            };
            let config = build_config(&cli, out.clone(), TemplateTarget::None)?;
            let transcription = VideoPipeline::new(config)
                .context("Failed to create video pipeline")?
                .transcribe(url, quality)
                .context("Transcription failed")?;
            if let Some(transcription) = transcription {
                println!("SUCCESS: {}", transcription.vtt.display());
                println!(
                    "Audio file: {} (delete with: rm {})",
                    transcription.audio.display(),
                    transcription.audio.display()
                );
            }
        }
        Command::Render { info_json, out } => {
            let config = build_config(&cli, PathBuf::from("."), TemplateTarget::None)?;
            let document = render_info_file(&config, info_json, out.as_deref())
                .with_context(|| format!("Failed to render {}", info_json.display()))?;
            if out.is_none() {
                print!("{}", document.to_markdown());
            }
        }
        Command::FinalizeComments { base, out } => {
            let config = build_config(&cli, out.clone(), TemplateTarget::Comments)?;
            let path = Finalizer::new(config)
                .context("Failed to load templates")?
                .finalize_comments(base)
                .context("Finalizing comments failed")?;
            println!("Final file: {}", path.display());
        }
        Command::Finalize { base, out } => {
            let config = build_config(&cli, out.clone(), TemplateTarget::Video)?;
            let path = Finalizer::new(config)
                .context("Failed to load templates")?
                .finalize_video(base)
                .context("Finalizing video document failed")?;
            println!("Final file: {}", path.display());
        }
        Command::DedupVtt { input, output } => {
            let config = build_config(&cli, PathBuf::from("."), TemplateTarget::None)?;
            let lines = deduplicate_vtt_file(&config, input, output)
                .context("Caption de-duplication failed")?;
            println!("SUCCESS: {} ({lines} lines)", output.display());
        }
        Command::Paragraphs {
            input,
            output,
            breaks,
        } => {
            let config = build_config(&cli, PathBuf::from("."), TemplateTarget::None)?;
            let paragraphs = paragraph_file(&config, input, output, breaks)
                .context("Paragraph assembly failed")?;
            println!("SUCCESS: {} ({paragraphs} paragraphs)", output.display());
        }
    }

    Ok(())
}

fn build_config(cli: &Cli, out: PathBuf, target: TemplateTarget) -> anyhow::Result<Config> {
    let mut builder = Config::builder()
        .output_dir(out)
        .top_level_cap(cli.top_level_cap)
        .ytdlp_binary(cli.ytdlp.clone())
        .subtitle_lang(cli.lang.clone())
        .keep_intermediate(cli.debug)
        .backup_existing(!cli.no_backup)
        .dry_run(cli.dry_run);

    if let Some(template) = &cli.template {
        builder = match target {
            TemplateTarget::Comments => builder.comments_template(template),
            TemplateTarget::Video => builder.video_template(template),
            TemplateTarget::None => {
                tracing::warn!("--template only applies to finalize commands");
                builder
            }
        };
    }

    builder.build().context("Failed to build configuration")
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("yt_comments_md=info"),
        1 => EnvFilter::new("yt_comments_md=debug"),
        _ => EnvFilter::new("yt_comments_md=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
