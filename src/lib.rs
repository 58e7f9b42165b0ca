//! lclp-translations
//!
//! Locale-keyed translation strings loaded from JSON files in directories and
//! archives, served through a thread-safe [`Translator`] with live reload.

pub mod config;
pub mod loader;
pub mod model;
pub mod parser;
mod test_utils;
pub mod translator;

pub use loader::{
    LoadError,
    ResourceLoader,
    ResourceSource,
    StaticTranslationLoader,
    TranslationLoader,
};
pub use model::{
    Language,
    LanguageCollection,
};
pub use translator::{
    DateFormat,
    Translator,
};
