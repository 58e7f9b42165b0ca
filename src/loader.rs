//! Translation loaders
/// Directory/archive backed loader
mod resource;
/// Resource locations and entry filtering
pub mod source;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{
    self,
    BoxFuture,
};
use thiserror::Error;

use crate::model::LanguageCollection;

pub use resource::ResourceLoader;
pub use source::{
    ArchiveFetcher,
    FileFilter,
    InMemoryArchive,
    ResourceSource,
    SourceError,
};

/// Failures of the load task itself.
///
/// Broken files or unreachable sources never surface here.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No async runtime available to run the load task: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    #[error("Load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Produces complete [`LanguageCollection`]s on demand.
///
/// The [`Translator`](crate::Translator) depends on this trait only, so any
/// transport (filesystem, archives, network) can back it.
pub trait TranslationLoader: Send + Sync + fmt::Debug {
    /// Starts a load pass and returns immediately.
    fn load(&self) -> BoxFuture<'static, Result<LanguageCollection, LoadError>>;
}

/// Loader returning a fixed collection.
#[derive(Debug, Clone, Default)]
pub struct StaticTranslationLoader {
    collection: Arc<LanguageCollection>,
}

impl StaticTranslationLoader {
    #[must_use]
    pub fn new(collection: LanguageCollection) -> Self {
        Self { collection: Arc::new(collection) }
    }
}

/// Loader over nested `locale -> (key -> value)` maps.
impl From<HashMap<String, HashMap<String, String>>> for StaticTranslationLoader {
    fn from(maps: HashMap<String, HashMap<String, String>>) -> Self {
        Self::new(LanguageCollection::from(maps))
    }
}

impl TranslationLoader for StaticTranslationLoader {
    fn load(&self) -> BoxFuture<'static, Result<LanguageCollection, LoadError>> {
        future::ready(Ok(LanguageCollection::clone(&self.collection))).boxed()
    }
}
