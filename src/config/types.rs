use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::loader::SourceError;
use crate::loader::source::{
    DEFAULT_FILE_EXTENSION,
    DEFAULT_MAX_DEPTH,
};
use crate::parser::json::DEFAULT_KEY_SEPARATOR;
use crate::translator::DEFAULT_LOCALE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "sources[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid translation source: {0}")]
    Source(#[from] SourceError),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationSettings {
    /// Directories, archives or `file:`/`jar:` URLs, processed in order.
    pub sources: Vec<String>,

    /// Path prefixes inside each source that hold translation files.
    /// An empty prefix accepts every path.
    pub resource_directories: Vec<String>,

    pub file_extension: String,

    /// Optional glob every relative file path must match.
    pub file_pattern: Option<String>,

    /// Joins nested JSON object keys.
    pub key_separator: String,

    pub max_depth: usize,

    /// Fallback locale for missing locales and keys.
    pub default_locale: String,
}

impl TranslationSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Zero walk depth
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.sources.is_empty() {
            errors.push(ValidationError::new(
                "sources",
                "At least one source is required. Example: [\".\"] or [\"plugins/lang.jar\"]",
            ));
        }

        for (index, source) in self.sources.iter().enumerate() {
            if source.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("sources[{index}]"),
                    "The source cannot be empty. Specify a path or a file: URL",
                ));
            }
        }

        if self.resource_directories.is_empty() {
            errors.push(ValidationError::new(
                "resourceDirectories",
                "At least one directory is required. Example: [\"lang/\"], or [\"\"] to accept every path",
            ));
        }

        if self.file_extension.is_empty() {
            errors.push(ValidationError::new(
                "fileExtension",
                "The extension cannot be empty. Example: \".json\"",
            ));
        }

        if let Some(pattern) = &self.file_pattern
            && let Err(e) = globset::Glob::new(pattern)
        {
            errors.push(ValidationError::new(
                "filePattern",
                format!("Invalid glob pattern '{pattern}': {e}"),
            ));
        }

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if self.max_depth == 0 {
            errors.push(ValidationError::new(
                "maxDepth",
                "The depth must be at least 1 so that files inside the source are visited",
            ));
        }

        if self.default_locale.is_empty() {
            errors.push(ValidationError::new(
                "defaultLocale",
                "The default locale cannot be empty. Example: \"en_us\"",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            sources: vec![".".to_string()],
            resource_directories: vec!["lang/".to_string()],
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            file_pattern: None,
            key_separator: DEFAULT_KEY_SEPARATOR.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = TranslationSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"resourceDirectories": ["i18n/"], "defaultLocale": "de_de"}"#;

        let settings: TranslationSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.key_separator, eq("."));
        assert_that!(settings.resource_directories, elements_are![eq("i18n/")]);
        assert_that!(settings.default_locale, eq("de_de"));
        assert_that!(settings.file_pattern, none());
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let json = "{}";

        let settings: TranslationSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.sources, elements_are![eq(".")]);
        assert_that!(settings.resource_directories, elements_are![eq("lang/")]);
        assert_that!(settings.file_extension, eq(".json"));
        assert_that!(settings.max_depth, eq(256));
        assert_that!(settings.default_locale, eq("en_us"));
    }

    #[rstest]
    fn validate_invalid_key_separator_empty() {
        let settings =
            TranslationSettings { key_separator: String::new(), ..TranslationSettings::default() };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("keySeparator")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_resource_directories_empty() {
        let settings =
            TranslationSettings { resource_directories: vec![], ..TranslationSettings::default() };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("resourceDirectories")),
                field!(ValidationError.message, contains_substring("At least one directory"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_source_entry() {
        let settings = TranslationSettings {
            sources: vec!["lang.jar".to_string(), "  ".to_string()],
            ..TranslationSettings::default()
        };
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![field!(ValidationError.field_path, eq("sources[1]"))])
        );
    }

    #[rstest]
    fn validate_invalid_file_pattern() {
        let settings = TranslationSettings {
            file_pattern: Some("lang/{a,b".to_string()),
            ..TranslationSettings::default()
        };

        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![all![
                field!(ValidationError.field_path, eq("filePattern")),
                field!(ValidationError.message, contains_substring("Invalid glob pattern")),
                field!(ValidationError.message, contains_substring("lang/{a,b"))
            ]])
        );
    }

    #[rstest]
    #[case(TranslationSettings { max_depth: 0, ..TranslationSettings::default() }, "maxDepth")]
    #[case(TranslationSettings { default_locale: String::new(), ..TranslationSettings::default() }, "defaultLocale")]
    #[case(TranslationSettings { file_extension: String::new(), ..TranslationSettings::default() }, "fileExtension")]
    #[case(TranslationSettings { sources: vec![], ..TranslationSettings::default() }, "sources")]
    fn validate_reports_field(#[case] settings: TranslationSettings, #[case] field_path: &str) {
        let errors = settings.validate().unwrap_err();

        assert_that!(errors, elements_are![field!(ValidationError.field_path, eq(field_path))]);
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = TranslationSettings {
            key_separator: String::new(),
            resource_directories: vec![],
            ..TranslationSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. resourceDirectories"));
        assert_that!(error_message, contains_substring("2. keySeparator"));
        assert_that!(error_message, contains_substring("cannot be empty"));
    }
}
