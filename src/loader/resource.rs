//! Loads translation files from directories and archives.

use std::fmt;
use std::path::Path;

use futures::FutureExt;
use futures::future::{
    self,
    BoxFuture,
};
use tokio::runtime::Handle;

use super::source::{
    DEFAULT_MAX_DEPTH,
    FileFilter,
    ResourceSource,
};
use super::{
    LoadError,
    TranslationLoader,
};
use crate::config::{
    ConfigError,
    TranslationSettings,
};
use crate::model::LanguageCollection;
use crate::parser::json::DEFAULT_KEY_SEPARATOR;
use crate::parser::{
    JsonTranslationParser,
    ParserFactory,
    TranslationParser,
};

/// Loads every qualifying translation file of its sources into one collection.
///
/// Sources are processed in order and files within a source in a stable
/// order, so colliding keys resolve deterministically (last file wins).
/// The pass runs on the tokio blocking pool.
#[derive(Clone)]
pub struct ResourceLoader {
    sources: Vec<ResourceSource>,
    filter: FileFilter,
    max_depth: usize,
    parser_factory: ParserFactory,
    runtime: Option<Handle>,
}

impl ResourceLoader {
    #[must_use]
    pub fn new(sources: Vec<ResourceSource>, filter: FileFilter, parser_factory: ParserFactory) -> Self {
        Self { sources, filter, max_depth: DEFAULT_MAX_DEPTH, parser_factory, runtime: None }
    }

    /// JSON loader for `*.json` files below `resource_directories`.
    pub fn json<I, S>(sources: Vec<ResourceSource>, resource_directories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            sources,
            FileFilter::new(resource_directories),
            JsonTranslationParser::factory(DEFAULT_KEY_SEPARATOR),
        )
    }

    /// Builds a loader from validated settings.
    ///
    /// Relative source paths are resolved against `base_dir`.
    ///
    /// # Errors
    /// - Settings fail validation
    /// - A source location cannot be parsed
    pub fn from_settings(settings: &TranslationSettings, base_dir: &Path) -> Result<Self, ConfigError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        let sources = settings
            .sources
            .iter()
            .map(|location| -> Result<ResourceSource, ConfigError> {
                let source = ResourceSource::parse_location(location)?;
                Ok(match source {
                    ResourceSource::Directory(path) if path.is_relative() => {
                        ResourceSource::from_path(base_dir.join(path))
                    }
                    ResourceSource::Archive(path) if path.is_relative() => {
                        ResourceSource::from_path(base_dir.join(path))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut filter = FileFilter::new(settings.resource_directories.iter().cloned())
            .with_extension(settings.file_extension.clone());
        if let Some(pattern) = &settings.file_pattern {
            filter = filter.with_glob(pattern).map_err(|e| {
                ConfigError::ValidationErrors(vec![crate::config::ValidationError::new(
                    "filePattern",
                    format!("Invalid glob pattern '{pattern}': {e}"),
                )])
            })?;
        }

        let parser_factory = JsonTranslationParser::factory(settings.key_separator.clone());

        Ok(Self::new(sources, filter, parser_factory).with_max_depth(settings.max_depth))
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Runs load passes on `runtime` instead of the ambient one.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[ResourceSource] {
        &self.sources
    }

    /// Runs one load pass on the current thread.
    ///
    /// Files and sources that fail are logged and skipped.
    #[must_use]
    pub fn load_blocking(&self) -> LanguageCollection {
        let mut parser: Box<dyn TranslationParser> = (self.parser_factory)();

        for source in &self.sources {
            tracing::debug!(%source, "Loading translations");
            let result = source.visit(&self.filter, self.max_depth, &mut |name, locale, reader| {
                if let Err(err) = parser.parse(reader, locale) {
                    tracing::error!(file = name, %locale, %err, "Failed to parse translation file");
                }
            });
            if let Err(err) = result {
                tracing::error!(%source, %err, "Failed to load translation source");
            }
        }

        let collection = parser.build();
        tracing::debug!(languages = collection.len(), "Translation load pass finished");
        collection
    }
}

impl TranslationLoader for ResourceLoader {
    fn load(&self) -> BoxFuture<'static, Result<LanguageCollection, LoadError>> {
        let handle = match self.runtime.clone().map_or_else(Handle::try_current, Ok) {
            Ok(handle) => handle,
            Err(err) => return future::ready(Err(LoadError::from(err))).boxed(),
        };

        let loader = self.clone();
        let task = handle.spawn_blocking(move || loader.load_blocking());
        async move { task.await.map_err(LoadError::from) }.boxed()
    }
}

impl fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("sources", &self.sources)
            .field("filter", &self.filter)
            .field("max_depth", &self.max_depth)
            .field("parser_factory", &"<fn>")
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}
