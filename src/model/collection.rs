//! Snapshot of every loaded locale.

use std::collections::HashMap;

use super::language::{
    Language,
    MutableLanguage,
};

/// Immutable mapping from locale to [`Language`], produced once per load pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCollection {
    languages: HashMap<String, Language>,
}

impl LanguageCollection {
    #[must_use]
    pub const fn new(languages: HashMap<String, Language>) -> Self {
        Self { languages }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Language for `locale`. Unknown locales are `None`, never an empty placeholder.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&Language> {
        self.languages.get(locale)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Language)> {
        self.languages.iter().map(|(locale, language)| (locale.as_str(), language))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

/// Converts the nested `locale -> (key -> value)` map form.
impl From<HashMap<String, HashMap<String, String>>> for LanguageCollection {
    fn from(maps: HashMap<String, HashMap<String, String>>) -> Self {
        Self::new(maps.into_iter().map(|(locale, entries)| (locale, Language::new(entries))).collect())
    }
}

/// Mutable accumulator for a [`LanguageCollection`].
///
/// Owned by exactly one load pass; [`LanguageCollectionBuilder::build`] consumes it.
#[derive(Debug, Default)]
pub struct LanguageCollectionBuilder {
    languages: HashMap<String, MutableLanguage>,
}

impl LanguageCollectionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Language for `locale`, created on first use.
    pub fn language_mut(&mut self, locale: &str) -> &mut MutableLanguage {
        self.languages.entry(locale.to_string()).or_default()
    }

    /// Merges `entries` into `locale`, overwriting colliding keys.
    pub fn add_all(&mut self, locale: &str, entries: HashMap<String, String>) {
        self.language_mut(locale).add_all(entries);
    }

    #[must_use]
    pub fn build(self) -> LanguageCollection {
        LanguageCollection::new(
            self.languages.into_iter().map(|(locale, language)| (locale, language.freeze())).collect(),
        )
    }
}
