//! Theme and language preferences.

use retropost_core::{Language, Theme};

use super::CommandResult;
use crate::store::LocalStore;

#[allow(clippy::print_stdout)]
pub fn show(store: &LocalStore) {
    let preferences = store.preferences();
    println!("theme:    {}", preferences.theme);
    println!("language: {}", preferences.language);
}

/// Update whichever preferences are given.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn set(store: &mut LocalStore, theme: Option<Theme>, language: Option<Language>) -> CommandResult {
    let mut preferences = store.preferences();
    if let Some(theme) = theme {
        preferences.theme = theme;
    }
    if let Some(language) = language {
        preferences.language = language;
    }
    store.save_preferences(preferences)?;
    tracing::info!(theme = %preferences.theme, language = %preferences.language, "Preferences saved");
    show(store);
    Ok(())
}
