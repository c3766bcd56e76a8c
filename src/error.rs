use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the yt-comments-md library.
///
/// Thread reconstruction and rendering never fail; every variant here comes from
/// the surrounding plumbing (filesystem, yt-dlp, templates, configuration).
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Template rendering error.
    #[error("Failed to render template '{template}': {message}")]
    Template {
        /// Template name
        template: String,
        /// Error message
        message: String,
    },

    /// External template failed validation.
    #[error("Invalid template '{path}': {reason}")]
    TemplateValidation {
        /// Template path
        path: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Configuration validation error.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Detailed error message
        message: String,
    },

    /// JSON serialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message
        message: String,
    },

    /// URL does not carry a recognizable video id.
    #[error("Could not extract video ID from URL '{url}'")]
    InvalidUrl {
        /// The offending URL
        url: String,
    },

    /// Required external tool is not installed.
    #[error("{tool} is not installed\n{hint}")]
    ToolMissing {
        /// Tool binary name
        tool: String,
        /// Install instructions
        hint: String,
    },

    /// External command failed.
    #[error("Command '{command}' failed: {message}")]
    Command {
        /// Command line that was run
        command: String,
        /// Captured stderr or spawn error
        message: String,
    },

    /// Caption processing produced nothing.
    #[error("No text extracted from '{source_name}'")]
    EmptyTranscript {
        /// Input that was processed
        source_name: String,
    },

    /// Paragraph break list could not be parsed.
    #[error("Invalid break points format '{input}': {reason}")]
    InvalidBreaks {
        /// Raw break list
        input: String,
        /// Parse failure
        reason: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a template error.
    #[must_use]
    pub fn template(template: impl Into<String>, source: tera::Error) -> Self {
        Self::Template {
            template: template.into(),
            message: source.to_string(),
        }
    }

    /// Creates a template validation error.
    #[must_use]
    pub fn template_validation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TemplateValidation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a missing tool error with installation hints.
    #[must_use]
    pub fn tool_missing(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolMissing {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Creates a command failure error.
    #[must_use]
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates an empty transcript error.
    #[must_use]
    pub fn empty_transcript(source_name: impl Into<String>) -> Self {
        Self::EmptyTranscript {
            source_name: source_name.into(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Returns true if an external tool is missing.
    #[must_use]
    pub const fn is_tool_missing(&self) -> bool {
        matches!(self, Self::ToolMissing { .. })
    }
}

impl From<tera::Error> for Error {
    fn from(e: tera::Error) -> Self {
        Self::Template {
            template: "unknown".to_string(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("test message");
        assert!(err.is_config());
        assert!(err.to_string().contains("test message"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("/tmp/test.txt", io_err);
        assert!(err.is_io());
        assert!(err.to_string().contains("/tmp/test.txt"));
    }

    #[test]
    fn test_invalid_url_message() {
        let err = Error::invalid_url("https://example.com/video");
        assert!(err.to_string().contains("example.com/video"));
    }

    #[test]
    fn test_tool_missing() {
        let err = Error::ToolMissing {
            tool: "yt-dlp".to_string(),
            hint: "pip3 install yt-dlp".to_string(),
        };
        assert!(err.is_tool_missing());
        assert!(err.to_string().starts_with("yt-dlp is not installed"));
    }

    #[test]
    fn test_error_clone() {
        let err = Error::command("yt-dlp --version", "boom");
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }
}
