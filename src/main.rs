//! Loads a translation configuration once and reports what was found.
//!
//! Usage: `translations-check [DIR]`, where `DIR` holds `.translations.json`
//! (defaults to the current directory). Set `RUST_LOG=debug` to trace every file.

use std::path::PathBuf;
use std::process::ExitCode;

use lclp_translations::config::{
    self,
    TranslationSettings,
};
use lclp_translations::translator::DATE_FORMAT_KEY;
use lclp_translations::{
    ResourceLoader,
    Translator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dir = std::env::args_os().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);

    let settings = match config::load_from_dir(&dir) {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            tracing::info!(dir = %dir.display(), "No {} found, using defaults", config::CONFIG_FILE_NAME);
            TranslationSettings::default()
        }
        Err(err) => {
            tracing::error!(%err, "Failed to read configuration");
            return ExitCode::FAILURE;
        }
    };

    let loader = match ResourceLoader::from_settings(&settings, &dir) {
        Ok(loader) => loader,
        Err(err) => {
            tracing::error!(%err, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let translator =
        match Translator::create_with_default_locale(loader, settings.default_locale.clone()).await {
            Ok(translator) => translator,
            Err(err) => {
                tracing::error!(%err, "Failed to load translations");
                return ExitCode::FAILURE;
            }
        };

    let snapshot = translator.snapshot();
    for locale in translator.languages() {
        let keys = snapshot.get(&locale).map_or(0, |language| language.len());
        tracing::info!(%locale, keys, "Loaded language");
    }

    let default_locale = translator.default_locale();
    if !translator.has_translation(default_locale, DATE_FORMAT_KEY) {
        let format = translator.date_format(default_locale);
        tracing::info!(
            default_locale,
            pattern = format.pattern(),
            "Default locale has no date.format, using built-in pattern"
        );
    }

    ExitCode::SUCCESS
}
