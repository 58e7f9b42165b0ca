//! Translation resource locations.
//!
//! A [`ResourceSource`] knows how to enumerate the translation files it holds.
//! Every qualifying entry is handed to a visitor together with its display
//! name and the locale derived from its file name.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{
    Cursor,
    Read,
    Seek,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use globset::{
    GlobBuilder,
    GlobMatcher,
};
use ignore::WalkBuilder;
use thiserror::Error;
use url::Url;
use zip::ZipArchive;

/// Extension every translation file must carry.
pub const DEFAULT_FILE_EXTENSION: &str = ".json";

/// Maximum directory depth walked below a directory source.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Errors raised while enumerating a single source.
///
/// These never abort a load pass; the source is logged and skipped.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    #[error("Invalid resource location: {0}")]
    InvalidLocation(String),

    #[error("Unsupported location scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Failed to fetch archive: {0}")]
    Fetch(String),
}

/// Supplies the bytes of a zip archive stored somewhere other than the local
/// filesystem (an HTTP endpoint, an embedded blob, ...).
pub trait ArchiveFetcher: Send + Sync + fmt::Debug {
    /// Human readable location used in logs.
    fn describe(&self) -> String;

    /// # Errors
    /// Returns [`SourceError`] when the archive cannot be retrieved.
    fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

/// Archive already held in memory, e.g. from `include_bytes!`.
#[derive(Debug, Clone)]
pub struct InMemoryArchive {
    label: String,
    bytes: Arc<[u8]>,
}

impl InMemoryArchive {
    #[must_use]
    pub fn new(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { label: label.into(), bytes: bytes.into() }
    }
}

impl ArchiveFetcher for InMemoryArchive {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        Ok(self.bytes.to_vec())
    }
}

/// Decides which entries of a source are translation files.
///
/// An entry qualifies when its `/`-separated relative path starts with one of
/// the resource directories, ends with the file extension and is accepted by
/// the predicate.
#[derive(Clone)]
pub struct FileFilter {
    resource_directories: Vec<String>,
    extension: String,
    predicate: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl FileFilter {
    pub fn new<I, S>(resource_directories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resource_directories: resource_directories.into_iter().map(Into::into).collect(),
            extension: DEFAULT_FILE_EXTENSION.to_string(),
            predicate: Arc::new(|_| true),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Restricts entries to relative paths matching `pattern`.
    ///
    /// `*` does not cross `/`; use `**` for that.
    ///
    /// # Errors
    /// Returns an error if `pattern` is not a valid glob.
    pub fn with_glob(self, pattern: &str) -> Result<Self, globset::Error> {
        let matcher: GlobMatcher =
            GlobBuilder::new(pattern).literal_separator(true).build()?.compile_matcher();
        Ok(self.with_predicate(move |path| matcher.is_match(path)))
    }

    #[must_use]
    pub fn resource_directories(&self) -> &[String] {
        &self.resource_directories
    }

    /// Locale named by a qualifying entry: its base name without the
    /// configured extension.
    ///
    /// `lang/en_us.lang.json` with extension `.lang.json` → `en_us`
    #[must_use]
    pub fn locale_of(&self, relative_path: &str) -> Option<String> {
        let base = relative_path.rsplit(['/', '\\']).next().unwrap_or(relative_path);
        match base.strip_suffix(self.extension.as_str()) {
            Some(stem) => {
                let stem = stem.strip_suffix('.').unwrap_or(stem);
                (!stem.is_empty()).then(|| stem.to_string())
            }
            None => locale_from_file_name(base),
        }
    }

    #[must_use]
    pub fn matches(&self, relative_path: &str) -> bool {
        (self.predicate)(relative_path)
            && relative_path.ends_with(&self.extension)
            && self.resource_directories.iter().any(|dir| relative_path.starts_with(dir.as_str()))
    }
}

impl fmt::Debug for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileFilter")
            .field("resource_directories", &self.resource_directories)
            .field("extension", &self.extension)
            .field("predicate", &"<fn>")
            .finish()
    }
}

/// Locale represented by a translation file: its base name without extension.
///
/// `lang/en_us.json` → `en_us`
#[must_use]
pub fn locale_from_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Receives `(display name, locale, reader)` for every qualifying entry.
pub type EntryVisitor<'a> = dyn FnMut(&str, &str, &mut dyn Read) + 'a;

/// A location translation files are loaded from.
#[derive(Debug, Clone)]
pub enum ResourceSource {
    /// Local directory, walked recursively.
    Directory(PathBuf),
    /// Local zip or jar archive.
    Archive(PathBuf),
    /// Zip archive fetched through an [`ArchiveFetcher`].
    Remote(Arc<dyn ArchiveFetcher>),
}

impl ResourceSource {
    /// Directory if `path` is one, archive otherwise.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() { Self::Directory(path) } else { Self::Archive(path) }
    }

    /// Parses a location string.
    ///
    /// Accepts plain paths, `file:` URLs (a trailing `/` marks a directory)
    /// and `jar:<base>!<entry>` URLs. Jar URLs always resolve to the outer
    /// `<base>` archive; archives nested inside archives are not traversed.
    ///
    /// # Errors
    /// - Empty or malformed location
    /// - Scheme other than `file` or `jar:file`
    pub fn parse_location(location: &str) -> Result<Self, SourceError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(SourceError::InvalidLocation("empty location".to_string()));
        }

        if let Some(rest) = location.strip_prefix("jar:") {
            let base = rest.split_once('!').map_or(rest, |(base, _)| base);
            return Ok(Self::Archive(file_url_to_path(base)?));
        }

        if location.starts_with("file:") {
            let path = file_url_to_path(location)?;
            if location.ends_with('/') {
                return Ok(Self::Directory(path));
            }
            return Ok(Self::from_path(path));
        }

        if let Some((scheme, _)) = location.split_once("://") {
            return Err(SourceError::UnsupportedScheme(scheme.to_string()));
        }

        Ok(Self::from_path(location))
    }

    /// Splits a platform search path (`PATH` syntax) into sources.
    pub fn from_search_path(search_path: &OsStr) -> Vec<Self> {
        std::env::split_paths(search_path)
            .filter(|path| !path.as_os_str().is_empty())
            .map(Self::from_path)
            .collect()
    }

    /// Sources listed in the search path stored in environment variable `var`.
    pub fn from_env(var: &str) -> Vec<Self> {
        std::env::var_os(var).map(|value| Self::from_search_path(&value)).unwrap_or_default()
    }

    /// Feeds every qualifying entry of this source to `visitor`.
    ///
    /// Entries that cannot be opened are logged and skipped.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the source as a whole cannot be enumerated.
    pub fn visit(
        &self,
        filter: &FileFilter,
        max_depth: usize,
        visitor: &mut EntryVisitor<'_>,
    ) -> Result<(), SourceError> {
        match self {
            Self::Directory(dir) => visit_directory(dir, filter, max_depth, visitor),
            Self::Archive(path) => {
                let file = File::open(path)?;
                visit_archive(file, &path.display().to_string(), filter, visitor)
            }
            Self::Remote(fetcher) => {
                let label = fetcher.describe();
                tracing::debug!(source = %label, "Fetching remote archive");
                let bytes = fetcher.fetch()?;
                visit_archive(Cursor::new(bytes), &label, filter, visitor)
            }
        }
    }
}

impl fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => write!(f, "directory {}", path.display()),
            Self::Archive(path) => write!(f, "archive {}", path.display()),
            Self::Remote(fetcher) => write!(f, "remote {}", fetcher.describe()),
        }
    }
}

fn file_url_to_path(location: &str) -> Result<PathBuf, SourceError> {
    let url = Url::parse(location)
        .map_err(|e| SourceError::InvalidLocation(format!("{location}: {e}")))?;
    if url.scheme() != "file" {
        return Err(SourceError::UnsupportedScheme(url.scheme().to_string()));
    }
    url.to_file_path().map_err(|()| SourceError::InvalidLocation(location.to_string()))
}

fn visit_directory(
    dir: &Path,
    filter: &FileFilter,
    max_depth: usize,
    visitor: &mut EntryVisitor<'_>,
) -> Result<(), SourceError> {
    if !dir.is_dir() {
        return Err(SourceError::NotADirectory(dir.to_path_buf()));
    }
    // surface an unreadable root as a source error instead of a skipped entry
    drop(std::fs::read_dir(dir)?);

    for result in WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(?err, "Failed to read directory entry");
                continue;
            }
        };

        // links are not descended into, but linked files are read
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Ok(relative_path) = path.strip_prefix(dir) else {
            continue;
        };
        let normalized = relative_path
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !filter.matches(&normalized) {
            continue;
        }
        let Some(locale) = filter.locale_of(&normalized) else {
            continue;
        };

        tracing::debug!(path = %path.display(), %locale, "Reading translation file");
        match File::open(path) {
            Ok(mut file) => visitor(&path.display().to_string(), &locale, &mut file),
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "Failed to open translation file");
            }
        }
    }

    Ok(())
}

fn visit_archive<R: Read + Seek>(
    reader: R,
    label: &str,
    filter: &FileFilter,
    visitor: &mut EntryVisitor<'_>,
) -> Result<(), SourceError> {
    let mut archive = ZipArchive::new(reader)?;

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::error!(archive = label, index, %err, "Failed to read archive entry");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if !filter.matches(&name) {
            continue;
        }
        let Some(locale) = filter.locale_of(&name) else {
            continue;
        };

        tracing::debug!(archive = label, entry = %name, %locale, "Reading zipped translation file");
        visitor(&format!("{label}!/{name}"), &locale, &mut entry);
    }

    Ok(())
}
