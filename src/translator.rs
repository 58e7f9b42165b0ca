//! Thread-safe translation lookup with live reload.
/// Date pattern parsing and formatting
pub mod date_format;

use std::collections::HashMap;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
    RwLockReadGuard,
    RwLockWriteGuard,
};

use futures::FutureExt;
use futures::future::BoxFuture;

pub use date_format::{
    DEFAULT_DATE_PATTERN,
    DateFormat,
    DateFormatError,
};

use crate::loader::{
    LoadError,
    TranslationLoader,
};
use crate::model::LanguageCollection;

/// Locale used for fallback when none is configured.
pub const DEFAULT_LOCALE: &str = "en_us";

/// Translation key holding a locale's date pattern.
pub const DATE_FORMAT_KEY: &str = "date.format";

/// Serves translations from the most recently loaded [`LanguageCollection`].
///
/// Cloning is cheap and every clone shares the same state. The collection is
/// an immutable snapshot replaced wholesale on reload; readers always see one
/// complete snapshot.
///
/// # Locking
///
/// The collection, the date format cache and the published generation sit
/// behind one `RwLock`. The cache is cleared in the same critical section
/// that swaps the collection.
#[derive(Clone)]
pub struct Translator {
    inner: Arc<TranslatorInner>,
}

struct TranslatorInner {
    loader: Arc<dyn TranslationLoader>,
    default_locale: String,
    state: RwLock<TranslatorState>,
    /// Last generation handed out to a reload or replacement.
    issued_generation: AtomicU64,
}

struct TranslatorState {
    languages: Arc<LanguageCollection>,
    date_formats: HashMap<String, Arc<DateFormat>>,
    /// Generation of `languages`.
    generation: u64,
}

impl Translator {
    /// Translator with an empty collection and the `en_us` default locale.
    ///
    /// Nothing is loaded until [`Translator::reload`] is called.
    pub fn new(loader: impl TranslationLoader + 'static) -> Self {
        Self::with_default_locale(loader, DEFAULT_LOCALE)
    }

    pub fn with_default_locale(
        loader: impl TranslationLoader + 'static,
        default_locale: impl Into<String>,
    ) -> Self {
        Self::from_shared(Arc::new(loader), default_locale)
    }

    pub fn from_shared(loader: Arc<dyn TranslationLoader>, default_locale: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TranslatorInner {
                loader,
                default_locale: default_locale.into(),
                state: RwLock::new(TranslatorState {
                    languages: Arc::new(LanguageCollection::empty()),
                    date_formats: HashMap::new(),
                    generation: 0,
                }),
                issued_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Creates a translator and waits for its first load.
    ///
    /// # Errors
    /// Returns [`LoadError`] when the load task cannot run.
    pub async fn create(loader: impl TranslationLoader + 'static) -> Result<Self, LoadError> {
        let translator = Self::new(loader);
        translator.reload().await?;
        Ok(translator)
    }

    /// [`Translator::create`] with a custom default locale.
    ///
    /// # Errors
    /// Returns [`LoadError`] when the load task cannot run.
    pub async fn create_with_default_locale(
        loader: impl TranslationLoader + 'static,
        default_locale: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let translator = Self::with_default_locale(loader, default_locale);
        translator.reload().await?;
        Ok(translator)
    }

    fn read(&self) -> RwLockReadGuard<'_, TranslatorState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TranslatorState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.inner.default_locale
    }

    /// The collection currently being served.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LanguageCollection> {
        Arc::clone(&self.read().languages)
    }

    /// Translation of `key` in `locale`.
    ///
    /// Falls back to the default locale, then to `key` itself.
    #[must_use]
    pub fn translate(&self, locale: &str, key: &str) -> String {
        let languages = self.snapshot();

        languages
            .get(locale)
            .and_then(|language| language.get(key))
            .or_else(|| languages.get(self.default_locale()).and_then(|language| language.get(key)))
            .map_or_else(|| key.to_string(), str::to_string)
    }

    /// Whether `locale` itself defines `key`. No fallback.
    #[must_use]
    pub fn has_translation(&self, locale: &str, key: &str) -> bool {
        self.snapshot().get(locale).is_some_and(|language| language.has(key))
    }

    /// Date format for `locale`, parsed from its `date.format` translation.
    ///
    /// Locales without one share the default locale's format, or the built-in
    /// [`DEFAULT_DATE_PATTERN`] when the default locale has none either.
    /// Results are cached until the next reload.
    #[must_use]
    pub fn date_format(&self, locale: &str) -> Arc<DateFormat> {
        let languages = {
            let state = self.read();
            if let Some(format) = state.date_formats.get(locale) {
                return Arc::clone(format);
            }
            Arc::clone(&state.languages)
        };
        let pattern_of =
            |locale: &str| languages.get(locale).and_then(|language| language.get(DATE_FORMAT_KEY));

        let (slot, pattern) = match pattern_of(locale) {
            Some(pattern) => (locale, Some(pattern)),
            None => {
                let default_locale = self.default_locale();
                if let Some(format) = self.read().date_formats.get(default_locale) {
                    return Arc::clone(format);
                }
                (default_locale, pattern_of(default_locale))
            }
        };

        let format = Arc::new(pattern.map_or_else(DateFormat::builtin, |pattern| {
            DateFormat::parse(pattern).unwrap_or_else(|err| {
                tracing::warn!(locale = slot, pattern, %err, "Invalid date format, using built-in pattern");
                DateFormat::builtin()
            })
        }));

        let mut state = self.write();
        if !Arc::ptr_eq(&state.languages, &languages) {
            // collection was replaced meanwhile; do not cache against the new one
            return format;
        }
        Arc::clone(state.date_formats.entry(slot.to_string()).or_insert(format))
    }

    /// Sorted locales of the current collection.
    #[must_use]
    pub fn languages(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.snapshot().locales().map(str::to_string).collect();
        locales.sort_unstable();
        locales
    }

    /// Loads translations and swaps them in once the load completes.
    ///
    /// The load starts immediately. If a reload started later has already been
    /// published when this one completes, the older result is discarded.
    ///
    /// # Errors
    /// The returned future fails with [`LoadError`] when the load task cannot run.
    pub fn reload(&self) -> BoxFuture<'static, Result<(), LoadError>> {
        let generation = self.next_generation();
        let translator = self.clone();

        tracing::debug!(generation, "Reloading translations");
        self.inner
            .loader
            .load()
            .map(move |result| -> Result<(), LoadError> {
                let collection = result?;
                if !translator.publish(generation, collection) {
                    tracing::debug!(generation, "Discarding stale translation reload");
                }
                Ok(())
            })
            .boxed()
    }

    /// Replaces the served collection immediately.
    pub fn replace_collection(&self, collection: LanguageCollection) {
        let generation = self.next_generation();
        self.publish(generation, collection);
    }

    fn next_generation(&self) -> u64 {
        self.inner.issued_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Swaps in `collection` unless a newer generation is already published.
    fn publish(&self, generation: u64, collection: LanguageCollection) -> bool {
        let languages = collection.len();
        let mut state = self.write();
        if generation < state.generation {
            return false;
        }

        state.languages = Arc::new(collection);
        state.date_formats.clear();
        state.generation = generation;
        drop(state);

        tracing::info!(languages, generation, "Translations updated");
        true
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Translator")
            .field("loader", &self.inner.loader)
            .field("default_locale", &self.inner.default_locale)
            .field("languages", &state.languages.len())
            .field("cached_date_formats", &state.date_formats.len())
            .field("generation", &state.generation)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use googletest::prelude::*;
    use rstest::rstest;
    use tokio::sync::oneshot;

    use super::*;
    use crate::loader::StaticTranslationLoader;
    use crate::test_utils::collection;

    fn translator() -> Translator {
        let translator = Translator::new(StaticTranslationLoader::default());
        translator.replace_collection(collection(&[
            ("en_us", &[("greeting", "Hello"), ("only.default", "Default")]),
            ("de_de", &[("greeting", "Hallo")]),
        ]));
        translator
    }

    /// Loader handing out results in the order its receivers are queued.
    #[derive(Debug, Default)]
    struct ManualLoader {
        pending: Mutex<VecDeque<oneshot::Receiver<LanguageCollection>>>,
    }

    impl ManualLoader {
        fn push(&self) -> oneshot::Sender<LanguageCollection> {
            let (sender, receiver) = oneshot::channel();
            self.pending.lock().unwrap().push_back(receiver);
            sender
        }
    }

    impl TranslationLoader for Arc<ManualLoader> {
        fn load(&self) -> BoxFuture<'static, Result<LanguageCollection, LoadError>> {
            let receiver = self.pending.lock().unwrap().pop_front().unwrap();
            async move { Ok(receiver.await.unwrap()) }.boxed()
        }
    }

    #[rstest]
    #[case("de_de", "greeting", "Hallo")]
    #[case("en_us", "greeting", "Hello")]
    #[case("de_de", "only.default", "Default")]
    #[case("fr_fr", "greeting", "Hello")]
    #[case("fr_fr", "missing.key", "missing.key")]
    #[case("de_de", "missing.key", "missing.key")]
    fn test_translate_fallback_chain(#[case] locale: &str, #[case] key: &str, #[case] expected: &str) {
        assert_eq!(translator().translate(locale, key), expected);
    }

    #[rstest]
    #[case("de_de", "greeting", true)]
    #[case("de_de", "only.default", false)]
    #[case("fr_fr", "greeting", false)]
    #[case("en_us", "only.default", true)]
    fn test_has_translation_is_exact(#[case] locale: &str, #[case] key: &str, #[case] expected: bool) {
        assert_eq!(translator().has_translation(locale, key), expected);
    }

    #[googletest::test]
    fn test_has_translation_implies_stored_value() {
        let translator = translator();
        let snapshot = translator.snapshot();

        for (locale, language) in snapshot.iter() {
            for (key, value) in language.iter() {
                expect_that!(translator.has_translation(locale, key), eq(true));
                expect_that!(translator.translate(locale, key), eq(value));
            }
        }
    }

    #[googletest::test]
    fn test_empty_translator_echoes_key() {
        let translator = Translator::new(StaticTranslationLoader::default());

        expect_that!(translator.translate("en_us", "menu.open"), eq("menu.open"));
        expect_that!(translator.languages(), is_empty());
    }

    #[googletest::test]
    fn test_custom_default_locale() {
        let translator =
            Translator::with_default_locale(StaticTranslationLoader::default(), "de_de");
        translator.replace_collection(collection(&[
            ("en_us", &[("greeting", "Hello")]),
            ("de_de", &[("greeting", "Hallo")]),
        ]));

        expect_that!(translator.default_locale(), eq("de_de"));
        expect_that!(translator.translate("fr_fr", "greeting"), eq("Hallo"));
    }

    #[googletest::test]
    fn test_languages_sorted() {
        expect_that!(translator().languages(), elements_are![eq("de_de"), eq("en_us")]);
    }

    #[googletest::test]
    fn test_date_format_builtin_is_cached() {
        let translator = translator();

        let first = translator.date_format("de_de");
        let second = translator.date_format("de_de");
        let default = translator.date_format("en_us");

        expect_that!(first.pattern(), eq(DEFAULT_DATE_PATTERN));
        expect_that!(Arc::ptr_eq(&first, &second), eq(true));
        expect_that!(Arc::ptr_eq(&first, &default), eq(true));
    }

    #[googletest::test]
    fn test_date_format_locale_and_default() {
        let translator = Translator::new(StaticTranslationLoader::default());
        translator.replace_collection(collection(&[
            ("en_us", &[("date.format", "MM/dd/yyyy")]),
            ("de_de", &[("date.format", "dd.MM.yyyy")]),
            ("fr_fr", &[("greeting", "Bonjour")]),
        ]));

        expect_that!(translator.date_format("de_de").pattern(), eq("dd.MM.yyyy"));
        expect_that!(translator.date_format("fr_fr").pattern(), eq("MM/dd/yyyy"));
        expect_that!(
            Arc::ptr_eq(&translator.date_format("fr_fr"), &translator.date_format("en_us")),
            eq(true)
        );
    }

    #[googletest::test]
    fn test_invalid_date_format_falls_back_to_builtin() {
        let translator = Translator::new(StaticTranslationLoader::default());
        translator.replace_collection(collection(&[("de_de", &[("date.format", "dd.QQ.yyyy")])]));

        let format = translator.date_format("de_de");

        expect_that!(format.pattern(), eq(DEFAULT_DATE_PATTERN));
        expect_that!(Arc::ptr_eq(&format, &translator.date_format("de_de")), eq(true));
    }

    #[googletest::test]
    fn test_replace_collection_clears_date_formats() {
        let translator = Translator::new(StaticTranslationLoader::default());
        translator.replace_collection(collection(&[("de_de", &[("date.format", "dd.MM.yyyy")])]));
        let before = translator.date_format("de_de");

        translator.replace_collection(collection(&[("de_de", &[("date.format", "yyyy-MM-dd")])]));
        let after = translator.date_format("de_de");

        expect_that!(before.pattern(), eq("dd.MM.yyyy"));
        expect_that!(after.pattern(), eq("yyyy-MM-dd"));
    }

    #[tokio::test]
    async fn test_reload_swaps_collection() {
        let loaded = collection(&[("en_us", &[("key", "value")])]);
        let translator = Translator::new(StaticTranslationLoader::new(loaded));

        assert_that!(translator.languages(), is_empty());
        translator.reload().await.unwrap();

        assert_that!(translator.languages(), elements_are![eq("en_us")]);
        assert_that!(translator.translate("en_us", "key"), eq("value"));
    }

    #[tokio::test]
    async fn test_create_loads_once() {
        let loaded = collection(&[("en_us", &[("key", "value")])]);

        let translator = Translator::create(StaticTranslationLoader::new(loaded)).await.unwrap();

        assert_that!(translator.has_translation("en_us", "key"), eq(true));
    }

    #[tokio::test]
    async fn test_stale_reload_is_discarded() {
        let loader = Arc::new(ManualLoader::default());
        let older = loader.push();
        let newer = loader.push();
        let translator = Translator::new(Arc::clone(&loader));

        let first = translator.reload();
        let second = translator.reload();

        newer.send(collection(&[("en_us", &[("key", "new")])])).unwrap();
        second.await.unwrap();
        older.send(collection(&[("en_us", &[("key", "old")])])).unwrap();
        first.await.unwrap();

        assert_that!(translator.translate("en_us", "key"), eq("new"));
    }

    #[tokio::test]
    async fn test_in_order_reloads_publish_latest() {
        let loader = Arc::new(ManualLoader::default());
        let older = loader.push();
        let newer = loader.push();
        let translator = Translator::new(Arc::clone(&loader));

        let first = translator.reload();
        let second = translator.reload();

        older.send(collection(&[("en_us", &[("key", "old")])])).unwrap();
        first.await.unwrap();
        assert_that!(translator.translate("en_us", "key"), eq("old"));

        newer.send(collection(&[("en_us", &[("key", "new")])])).unwrap();
        second.await.unwrap();
        assert_that!(translator.translate("en_us", "key"), eq("new"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_observe_partial_collection() {
        const PAIRS: &[(&str, &str)] = &[("k", "v")];
        let old_set = ["a", "b", "c"];
        let new_set = ["d", "e", "f", "g"];
        let build = |locales: &[&str]| {
            let entries: Vec<(&str, &[(&str, &str)])> =
                locales.iter().map(|locale| (*locale, PAIRS)).collect();
            collection(&entries)
        };

        let translator = Translator::new(StaticTranslationLoader::default());
        translator.replace_collection(build(&old_set));

        let reader = {
            let translator = translator.clone();
            tokio::task::spawn_blocking(move || {
                for _ in 0..10_000 {
                    let seen = translator.languages();
                    let seen: Vec<&str> = seen.iter().map(String::as_str).collect();
                    assert!(seen == old_set || seen == new_set, "observed mixed set {seen:?}");
                }
            })
        };

        for round in 0..200 {
            let set: &[&str] = if round % 2 == 0 { &new_set } else { &old_set };
            translator.replace_collection(build(set));
            tokio::task::yield_now().await;
        }

        reader.await.unwrap();
    }
}
