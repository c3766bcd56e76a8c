use crate::error::{Error, Result};
use crate::template::DocumentKind;
use std::fs;
use std::path::Path;
use tera::Tera;

/// Maximum template file size (1MB)
const MAX_TEMPLATE_SIZE: u64 = 1024 * 1024;

/// Validates external Tera templates
pub(crate) struct TemplateValidator;

impl TemplateValidator {
    /// Checks that `path` is a readable file of at most 1MB whose non-blank
    /// content compiles in Tera and references one of `kind`'s variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::TemplateValidation`] for any other rejection.
    pub(crate) fn validate_template(path: &Path, kind: DocumentKind) -> Result<()> {
        let reject = |reason: String| Error::template_validation(path.to_string_lossy(), reason);

        match fs::metadata(path).map_err(|e| Error::io(path, e))? {
            meta if !meta.is_file() => return Err(reject("Path is not a file".into())),
            meta if meta.len() > MAX_TEMPLATE_SIZE => {
                return Err(reject(format!(
                    "Template file too large: {} bytes (max: {MAX_TEMPLATE_SIZE} bytes)",
                    meta.len()
                )));
            }
            _ => {}
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        if content.trim().is_empty() {
            return Err(reject("Template file is empty".into()));
        }

        Tera::default()
            .add_raw_template(kind.template_name(), &content)
            .map_err(|e| reject(format!("Template syntax error: {e}")))?;

        Self::check_variables(&content, path, kind)
    }

    /// Heuristic search for variable references; unused ones are only logged.
    fn check_variables(content: &str, path: &Path, kind: DocumentKind) -> Result<()> {
        let (used, unused): (Vec<&str>, Vec<&str>) = kind
            .variables()
            .iter()
            .copied()
            .partition(|var| Self::references(content, var));

        for var in &unused {
            tracing::debug!("Template does not use variable: {}", var);
        }

        if used.is_empty() {
            return Err(Error::template_validation(
                path.to_string_lossy(),
                format!(
                    "Template references none of the {} variables: {}",
                    kind.template_name(),
                    kind.variables().join(", ")
                ),
            ));
        }

        Ok(())
    }

    fn references(content: &str, var: &str) -> bool {
        let patterns = [
            format!("{{{{{var}"),  // {{var
            format!("{{{{ {var}"), // {{ var
            format!("if {var}"),   // {% if var %}
            format!("in {var}"),   // {% for x in var %}
        ];
        patterns.iter().any(|pattern| content.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_validate_valid_template() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template_file = temp.child("comments.tera");
        template_file
            .write_str("# {{ video_name }}\n\n{{ comments }}")
            .unwrap();

        let result =
            TemplateValidator::validate_template(template_file.path(), DocumentKind::Comments);
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_nonexistent_file() {
        let result = TemplateValidator::validate_template(
            Path::new("/nonexistent/template.tera"),
            DocumentKind::Video,
        );
        assert!(result.unwrap_err().is_io());
    }

    #[test]
    fn test_validate_directory_is_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();

        let err = TemplateValidator::validate_template(temp.path(), DocumentKind::Comments)
            .unwrap_err();
        assert!(!err.is_io());
        assert!(err.to_string().contains("not a file"));
    }

    #[test]
    fn test_validate_empty_template() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template_file = temp.child("empty.tera");
        template_file.write_str("   \n  \n  ").unwrap();

        let result = TemplateValidator::validate_template(template_file.path(), DocumentKind::Video);
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_syntax_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template_file = temp.child("invalid.tera");
        template_file
            .write_str("{% if comments %}\nUnclosed if")
            .unwrap();

        let result =
            TemplateValidator::validate_template(template_file.path(), DocumentKind::Comments);
        assert!(result.unwrap_err().to_string().contains("Template syntax error"));
    }

    #[test]
    fn test_validate_wrong_kind_variables() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template_file = temp.child("video.tera");
        template_file.write_str("{{ comments }}").unwrap();

        let result = TemplateValidator::validate_template(template_file.path(), DocumentKind::Video);
        assert!(result.unwrap_err().to_string().contains("references none"));
    }

    #[test]
    fn test_validate_file_too_large() {
        let temp = assert_fs::TempDir::new().unwrap();
        let template_file = temp.child("large.tera");

        let large_content = "x".repeat((MAX_TEMPLATE_SIZE + 1) as usize);
        template_file.write_str(&large_content).unwrap();

        let result = TemplateValidator::validate_template(template_file.path(), DocumentKind::Video);
        assert!(result.unwrap_err().to_string().contains("too large"));
    }
}
