use crate::{
    config::Config,
    error::{Error, Result},
};
use serde::Serialize;
use std::fs;
use tera::{Context, Tera};
use tracing::debug;

/// Final document kinds, each with its own template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Comment analysis document
    Comments,
    /// Video document (metadata, summary, description, transcript)
    Video,
}

impl DocumentKind {
    /// Name the template is registered under.
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Comments => "comments",
            Self::Video => "video",
        }
    }

    /// Variables available to templates of this kind.
    #[must_use]
    pub const fn variables(self) -> &'static [&'static str] {
        match self {
            Self::Comments => &["video_name", "comment_gold", "comments"],
            Self::Video => &["metadata", "summary", "description", "transcription"],
        }
    }

    const fn builtin(self) -> &'static str {
        match self {
            Self::Comments => include_str!("../templates/comments.tera"),
            Self::Video => include_str!("../templates/video.tera"),
        }
    }
}

/// Values for the comment document template.
#[derive(Debug, Default, Serialize)]
pub struct CommentsDocument {
    /// Video title
    pub video_name: String,
    /// Curated highlights written by a reviewer
    pub comment_gold: String,
    /// Cleaned, rendered comment threads
    pub comments: String,
}

/// Values for the video document template.
#[derive(Debug, Default, Serialize)]
pub struct VideoDocument {
    /// Metadata bullet block
    pub metadata: String,
    /// Summary written by a reviewer
    pub summary: String,
    /// Video description
    pub description: String,
    /// Cleaned transcript
    pub transcription: String,
}

impl CommentsDocument {
    fn trimmed(&self) -> Self {
        Self {
            video_name: self.video_name.trim().to_string(),
            comment_gold: self.comment_gold.trim().to_string(),
            comments: self.comments.trim().to_string(),
        }
    }
}

impl VideoDocument {
    fn trimmed(&self) -> Self {
        Self {
            metadata: self.metadata.trim().to_string(),
            summary: self.summary.trim().to_string(),
            description: self.description.trim().to_string(),
            transcription: self.transcription.trim().to_string(),
        }
    }
}

/// Template engine assembling final documents.
pub(crate) struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Creates an engine with built-in templates, replaced by any external ones
    /// the configuration names.
    ///
    /// # Errors
    ///
    /// Returns an error if a template cannot be read or compiled.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let mut tera = Tera::default();

        for kind in [DocumentKind::Comments, DocumentKind::Video] {
            let name = kind.template_name();
            match config.template_for(kind) {
                Some(path) => {
                    let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                    tera.add_raw_template(name, &source)
                        .map_err(|e| Error::template(name, e))?;
                    debug!("Using external {} template {}", name, path.display());
                }
                None => {
                    tera.add_raw_template(name, kind.builtin())
                        .map_err(|e| Error::template(name, e))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Renders the comment document. Values are trimmed first.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render_comments(&self, doc: &CommentsDocument) -> Result<String> {
        self.render(DocumentKind::Comments, &doc.trimmed())
    }

    /// Renders the video document. Values are trimmed first.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn render_video(&self, doc: &VideoDocument) -> Result<String> {
        self.render(DocumentKind::Video, &doc.trimmed())
    }

    fn render<T: Serialize>(&self, kind: DocumentKind, values: &T) -> Result<String> {
        let name = kind.template_name();
        let context = Context::from_serialize(values).map_err(|e| Error::template(name, e))?;

        self.tera
            .render(name, &context)
            .map_err(|e| Error::template(name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    fn engine() -> TemplateEngine {
        TemplateEngine::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_render_builtin_comments() {
        let rendered = engine()
            .render_comments(&CommentsDocument {
                video_name: "  My Video\n".to_string(),
                comment_gold: "Best takes".to_string(),
                comments: "### 1. Alice (3 likes)\n\nHi\n\n".to_string(),
            })
            .unwrap();

        assert!(rendered.starts_with("# My Video\n"));
        assert!(rendered.contains("Best takes"));
        assert!(rendered.contains("### 1. Alice (3 likes)\n\nHi"));
    }

    #[test]
    fn test_markup_is_not_escaped() {
        let rendered = engine()
            .render_comments(&CommentsDocument {
                comments: "- **<b>&</b>**".to_string(),
                ..CommentsDocument::default()
            })
            .unwrap();
        assert!(rendered.contains("- **<b>&</b>**"));
    }

    #[test]
    fn test_render_builtin_video() {
        let rendered = engine()
            .render_video(&VideoDocument {
                metadata: "- **Title:** [T](u)".to_string(),
                summary: "Short".to_string(),
                description: "Long".to_string(),
                transcription: "Words [00:00:00.000]".to_string(),
            })
            .unwrap();

        assert!(rendered.starts_with("- **Title:** [T](u)"));
        assert!(rendered.contains("## Transcription\n\nWords [00:00:00.000]"));
    }

    #[test]
    fn test_external_template_overrides_builtin() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template = temp.child("comments.tera");
        template
            .write_str("Title: {{ video_name }} | {{ comments }}")
            .unwrap();

        let config = Config::builder()
            .comments_template(template.path())
            .build()
            .unwrap();
        let rendered = TemplateEngine::new(&config)
            .unwrap()
            .render_comments(&CommentsDocument {
                video_name: "V".to_string(),
                comments: "C".to_string(),
                ..CommentsDocument::default()
            })
            .unwrap();

        assert_eq!(rendered, "Title: V | C");
    }

    #[test]
    fn test_variables_listed_for_each_kind() {
        assert!(DocumentKind::Comments.variables().contains(&"comments"));
        assert!(DocumentKind::Video.variables().contains(&"transcription"));
    }
}
