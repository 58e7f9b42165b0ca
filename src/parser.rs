//! Translation file parsers
/// JSON translation files
pub mod json;

use std::io::Read;
use std::sync::Arc;

use thiserror::Error;

use crate::model::LanguageCollection;

pub use json::{
    JsonTranslationParser,
    flatten_json,
};

/// Errors raised while parsing a single translation file.
///
/// These never abort a load pass; the file is logged and skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read translation file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Translation file root must be a JSON object")]
    NotAnObject,

    #[error("Value of '{key}' must be a string")]
    NonStringValue { key: String },

    #[error("Translation keys cannot be empty")]
    EmptyKey,
}

/// Accumulates translation files of one load pass into a [`LanguageCollection`].
pub trait TranslationParser: Send {
    /// Parses one file and merges its entries into `locale`.
    ///
    /// On error nothing from this file is kept.
    ///
    /// # Errors
    /// Returns [`ParseError`] when the stream cannot be read or is not a valid
    /// translation file.
    fn parse(&mut self, reader: &mut dyn Read, locale: &str) -> Result<(), ParseError>;

    /// Finishes the pass.
    fn build(self: Box<Self>) -> LanguageCollection;
}

/// Creates a fresh parser for each load pass.
pub type ParserFactory = Arc<dyn Fn() -> Box<dyn TranslationParser> + Send + Sync>;
