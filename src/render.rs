//! Depth-bounded Markdown rendering of a comment [`Forest`].
//!
//! Layout by depth below a top-level comment:
//!
//! | depth | output |
//! |-------|--------|
//! | 0 | `### {n}. author (likes likes)`, blank line, text |
//! | 1 | `#### author (likes likes)`, blank line, text |
//! | 2 | `##### author (likes likes)`, blank line, text |
//! | 3 | `- **author (likes likes)**: text` with its direct replies as sub-bullets |
//!
//! Replies below a sub-bullet (depth 5 and deeper) are dropped. This keeps long
//! sub-threads from exploding the document and is part of the output contract.

use crate::comment::CommentRecord;
use crate::thread::Forest;
use tracing::debug;

/// Default number of top-level comments rendered.
pub const DEFAULT_TOP_LEVEL_CAP: usize = 50;

/// Sole block emitted for an empty forest.
pub const NO_COMMENTS_PLACEHOLDER: &str = "No comments available\n";

/// Depths rendered as headings before flattening kicks in.
const HEADING_DEPTHS: usize = 3;

/// Heading level used for top-level comments.
const TOP_HEADING_LEVEL: usize = 3;

/// How a comment at a given depth is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// Markdown heading followed by the body; replies recurse one level deeper.
    Heading {
        /// Number of `#` characters
        level: usize,
    },
    /// Single bullet with direct replies as sub-bullets; no further recursion.
    Flatten,
}

impl RenderStyle {
    /// Picks the style for a comment `depth` levels below its top-level ancestor.
    #[must_use]
    pub const fn for_depth(depth: usize) -> Self {
        if depth < HEADING_DEPTHS {
            Self::Heading {
                level: TOP_HEADING_LEVEL + depth,
            }
        } else {
            Self::Flatten
        }
    }
}

/// Options for [`DepthBoundedRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Only the first `top_level_cap` top-level comments (and their replies) are rendered
    pub top_level_cap: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_level_cap: DEFAULT_TOP_LEVEL_CAP,
        }
    }
}

/// Rendered comment section as an ordered list of text blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    blocks: Vec<String>,
    top_level_blocks: usize,
    placeholder: bool,
}

impl RenderedDocument {
    fn placeholder() -> Self {
        Self {
            blocks: vec![NO_COMMENTS_PLACEHOLDER.to_string()],
            top_level_blocks: 0,
            placeholder: true,
        }
    }

    /// Blocks in output order, one per rendered comment.
    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Consumes the document, returning its blocks.
    #[must_use]
    pub fn into_blocks(self) -> Vec<String> {
        self.blocks
    }

    /// Concatenated Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        self.blocks.concat()
    }

    /// Number of numbered top-level headings.
    #[must_use]
    pub const fn top_level_blocks(&self) -> usize {
        self.top_level_blocks
    }

    /// Returns true if this is the "no comments" placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.placeholder
    }
}

/// Walks a [`Forest`] applying the per-depth [`RenderStyle`] policy.
#[derive(Debug, Clone, Default)]
pub struct DepthBoundedRenderer {
    options: RenderOptions,
}

impl DepthBoundedRenderer {
    /// Creates a renderer with the given options.
    #[must_use]
    pub const fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders the forest. Output depends only on the forest and the options.
    #[must_use]
    pub fn render(&self, forest: &Forest<'_>) -> RenderedDocument {
        if forest.is_empty() {
            debug!("No comments to render, emitting placeholder");
            return RenderedDocument::placeholder();
        }

        let mut blocks = Vec::new();
        let mut top_level_blocks = 0;

        for (index, comment) in forest
            .top_level()
            .iter()
            .take(self.options.top_level_cap)
            .enumerate()
        {
            blocks.push(heading_block(TOP_HEADING_LEVEL, Some(index + 1), comment));
            top_level_blocks += 1;

            for reply in forest.children(&comment.id) {
                Self::render_reply(forest, reply, 1, &mut blocks);
            }
        }

        debug!(
            "Rendered {} of {} top-level comments into {} blocks",
            top_level_blocks,
            forest.top_level_count(),
            blocks.len()
        );

        RenderedDocument {
            blocks,
            top_level_blocks,
            placeholder: false,
        }
    }

    fn render_reply(
        forest: &Forest<'_>,
        comment: &CommentRecord,
        depth: usize,
        blocks: &mut Vec<String>,
    ) {
        match RenderStyle::for_depth(depth) {
            RenderStyle::Heading { level } => {
                blocks.push(heading_block(level, None, comment));
                for reply in forest.children(&comment.id) {
                    Self::render_reply(forest, reply, depth + 1, blocks);
                }
            }
            RenderStyle::Flatten => {
                blocks.push(flattened_block(comment, forest.children(&comment.id)));
            }
        }
    }
}

fn byline(comment: &CommentRecord) -> String {
    format!(
        "{} ({} likes)",
        comment.author_or_placeholder(),
        comment.like_count
    )
}

fn heading_block(level: usize, number: Option<usize>, comment: &CommentRecord) -> String {
    let number = number.map(|n| format!("{n}. ")).unwrap_or_default();
    format!(
        "{} {}{}\n\n{}\n\n",
        "#".repeat(level),
        number,
        byline(comment),
        comment.text
    )
}

// Sub-bullets are the end of the line: replies to them are never looked up.
fn flattened_block(comment: &CommentRecord, replies: &[&CommentRecord]) -> String {
    let mut block = format!("- **{}**: {}\n\n", byline(comment), comment.text);

    for reply in replies {
        block.push_str(&format!("  - **{}**: {}\n", byline(reply), reply.text));
    }
    if !replies.is_empty() {
        block.push('\n');
    }

    block
}
