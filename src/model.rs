//! Translation data model
/// Locale mapping containers
mod collection;
/// Per-locale key mappings
mod language;

pub use collection::{
    LanguageCollection,
    LanguageCollectionBuilder,
};
pub use language::{
    Language,
    MutableLanguage,
};
