//! Test helpers shared by several test modules.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::io::{
    Cursor,
    Write,
};
use std::path::Path;

use zip::write::SimpleFileOptions;

use crate::model::{
    LanguageCollection,
    LanguageCollectionBuilder,
};

/// Builds a collection from `(locale, [(key, value)])` pairs.
pub(crate) fn collection(entries: &[(&str, &[(&str, &str)])]) -> LanguageCollection {
    let mut builder = LanguageCollectionBuilder::new();
    for (locale, pairs) in entries {
        let language = builder.language_mut(locale);
        for (key, value) in *pairs {
            language.add(*key, *value);
        }
    }
    builder.build()
}

/// Writes `content` to `root/relative`, creating parent directories.
pub(crate) fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Zip archive bytes containing `(name, content)` entries in order.
pub(crate) fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
