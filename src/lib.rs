//! # yt-comments-md
//!
//! Turns YouTube comment threads, video metadata and captions into readable
//! Markdown notes.
//!
//! ## Features
//!
//! - Rebuilds reply trees from yt-dlp's flat, parent-linked comment list
//! - Depth-bounded rendering: headings for shallow replies, bullets for deep ones
//! - Metadata, description and chapter extraction
//! - Caption download, Whisper fallback, de-duplication and paragraph assembly
//! - Tera templates for the final documents, with external overrides
//! - Atomic file operations with automatic backups
//!
//! ## Quick Start
//!
//! ```
//! use yt_comments_md::{CommentRecord, render_comments};
//!
//! let records = vec![
//!     CommentRecord::new("a", "root", "Alice", "Great talk", 12),
//!     CommentRecord::new("b", "a", "Bob", "Agreed", 3),
//! ];
//!
//! let markdown = render_comments(&records, 50).to_markdown();
//! assert!(markdown.starts_with("### 1. Alice (12 likes)\n\nGreat talk\n\n"));
//! assert!(markdown.contains("#### Bob (3 likes)\n\nAgreed\n\n"));
//! ```
//!
//! ## Architecture
//!
//! 1. **Source**: yt-dlp (or a saved info JSON) yields [`VideoInfo`]
//! 2. **ThreadBuilder**: groups comment records by parent into a [`Forest`]
//! 3. **DepthBoundedRenderer**: walks the forest into Markdown blocks
//! 4. **Writer**: persists work files, then final documents via templates

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod comment;
mod config;
mod error;
mod pipeline;
mod render;
mod template;
mod template_validator;
mod thread;
mod url;
mod writer;

pub mod transcript;
pub mod video;
pub mod whisper;
pub mod ytdlp;

pub use comment::{CommentRecord, ROOT_PARENT, UNKNOWN_AUTHOR};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use pipeline::{
    CommentStats, CommentsPipeline, Finalizer, Transcription, VideoOutput, VideoPipeline,
    deduplicate_vtt_file, paragraph_file, render_info_file,
};
pub use render::{
    DEFAULT_TOP_LEVEL_CAP, DepthBoundedRenderer, NO_COMMENTS_PLACEHOLDER, RenderOptions,
    RenderStyle, RenderedDocument,
};
pub use template::{CommentsDocument, DocumentKind, VideoDocument};
pub use thread::{Forest, ThreadBuilder};
pub use url::{base_name, extract_video_id, require_video_id, video_id_from_base};
pub use video::VideoInfo;
pub use whisper::{WhisperQuality, WhisperTools};
pub use writer::{MAX_TITLE_LEN, WorkFile, clean_title_for_filename, final_filename};
pub use ytdlp::{InfoSource, JsonFileSource, SubtitleKind, YtDlp};

/// Builds the reply forest for `records` and renders it.
///
/// At most `top_level_cap` top-level threads are emitted.
#[must_use]
pub fn render_comments(records: &[CommentRecord], top_level_cap: usize) -> RenderedDocument {
    let forest = ThreadBuilder::build(records);
    DepthBoundedRenderer::new(RenderOptions { top_level_cap }).render(&forest)
}

/// Extracts comments for `url` into work files with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - yt-dlp is missing or fails
/// - The URL has no video id
/// - A work file cannot be written
pub fn extract_comments(config: Config, url: &str) -> Result<CommentStats> {
    CommentsPipeline::new(config)?.run(url)
}
