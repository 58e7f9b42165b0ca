//! JSON translation file parser

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use serde_json::Value;

use super::{
    ParseError,
    ParserFactory,
    TranslationParser,
};
use crate::model::{
    LanguageCollection,
    LanguageCollectionBuilder,
};

/// Separator used to join nested object keys.
pub const DEFAULT_KEY_SEPARATOR: &str = ".";

/// Parses JSON translation files, flattening nested objects into joined keys.
#[derive(Debug)]
pub struct JsonTranslationParser {
    separator: String,
    builder: LanguageCollectionBuilder,
}

impl JsonTranslationParser {
    #[must_use]
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_KEY_SEPARATOR)
    }

    #[must_use]
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self { separator: separator.into(), builder: LanguageCollectionBuilder::new() }
    }

    /// Factory handing out a fresh parser joining keys with `separator`.
    #[must_use]
    pub fn factory(separator: impl Into<String>) -> ParserFactory {
        let separator = separator.into();
        Arc::new(move || -> Box<dyn TranslationParser> {
            Box::new(Self::with_separator(separator.clone()))
        })
    }
}

impl Default for JsonTranslationParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationParser for JsonTranslationParser {
    fn parse(&mut self, reader: &mut dyn Read, locale: &str) -> Result<(), ParseError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let json: Value = serde_json::from_str(&content)?;
        let entries = flatten_json(&json, &self.separator)?;

        tracing::trace!(locale, count = entries.len(), "Parsed translation entries");
        self.builder.add_all(locale, entries);
        Ok(())
    }

    fn build(self: Box<Self>) -> LanguageCollection {
        self.builder.build()
    }
}

/// Flatten a JSON translation object into a `separator`-joined key map.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use lclp_translations::parser::flatten_json;
///
/// let json = json!({
///     "date": {
///         "format": "dd.MM.yyyy"
///     }
/// });
///
/// let flattened = flatten_json(&json, ".").unwrap();
/// assert_eq!(flattened.get("date.format"), Some(&"dd.MM.yyyy".to_string()));
/// ```
///
/// # Errors
/// - The root is not an object
/// - A leaf is not a string
/// - A key is empty
pub fn flatten_json(json: &Value, separator: &str) -> Result<HashMap<String, String>, ParseError> {
    let Value::Object(map) = json else {
        return Err(ParseError::NotAnObject);
    };

    let mut result = HashMap::new();
    for (key, value) in map {
        flatten_json_value(value, separator, key, &mut result)?;
    }
    Ok(result)
}

fn flatten_json_value(
    json: &Value,
    separator: &str,
    key: &str,
    result: &mut HashMap<String, String>,
) -> Result<(), ParseError> {
    if key.is_empty() {
        return Err(ParseError::EmptyKey);
    }

    match json {
        Value::Object(map) => {
            for (child, value) in map {
                if child.is_empty() {
                    return Err(ParseError::EmptyKey);
                }
                let full_key = format!("{key}{separator}{child}");
                flatten_json_value(value, separator, &full_key, result)?;
            }
            Ok(())
        }
        Value::String(s) => {
            result.insert(key.to_string(), s.clone());
            Ok(())
        }
        _ => Err(ParseError::NonStringValue { key: key.to_string() }),
    }
}
