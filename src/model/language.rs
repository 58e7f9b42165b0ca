//! Per-locale translation mappings.

use std::collections::HashMap;

/// Immutable key to translation mapping for a single locale.
///
/// The locale itself is not stored; it is the key under which the language
/// lives inside a [`LanguageCollection`](super::LanguageCollection).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    entries: HashMap<String, String>,
}

impl Language {
    #[must_use]
    pub const fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Translation stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Language
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Append-only language used while a load pass is accumulating files.
///
/// Later additions overwrite earlier ones per key. Call [`MutableLanguage::freeze`]
/// once the pass is complete.
#[derive(Debug, Clone, Default)]
pub struct MutableLanguage {
    entries: HashMap<String, String>,
}

impl MutableLanguage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn add_all(&mut self, entries: HashMap<String, String>) {
        self.entries.extend(entries);
    }

    /// Copies every entry of `other` into this language.
    pub fn add_language(&mut self, other: &Language) {
        self.entries.extend(other.iter().map(|(k, v)| (k.to_string(), v.to_string())));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn freeze(self) -> Language {
        Language::new(self.entries)
    }
}

impl From<MutableLanguage> for Language {
    fn from(language: MutableLanguage) -> Self {
        language.freeze()
    }
}
