//! Client-local key-value store.
//!
//! A single JSON object in `<data dir>/storage.json`. Values are kept under
//! fixed keys. A missing file is an empty store; a file or value that cannot
//! be parsed loads as empty and is logged, so a damaged store never blocks
//! the client. A damaged file is moved to `storage.json.corrupt` first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use retropost_core::{Cart, Language, Order, Preferences, Theme};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub const CART_KEY: &str = "retropost_cart";
pub const ORDERS_KEY: &str = "retropost_orders";
pub const THEME_KEY: &str = "retropost_theme";
pub const LANGUAGE_KEY: &str = "retropost_language";

const FILE_NAME: &str = "storage.json";
const CORRUPT_EXTENSION: &str = "json.corrupt";
const DEFAULT_DATA_DIR: &str = ".retropost";

/// Errors writing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl LocalStore {
    /// `RETROPOST_DATA_DIR`, or `.retropost` in the working directory.
    #[must_use]
    pub fn data_dir() -> PathBuf {
        std::env::var_os("RETROPOST_DATA_DIR")
            .filter(|dir| !dir.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
    }

    /// Open the store in `dir`. Never fails; see the module docs.
    #[must_use]
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(FILE_NAME);
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<Map<String, Value>>(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Corrupt store, starting empty");
                preserve_corrupt(&path);
                Map::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unreadable store, starting empty");
                Map::new()
            }
        };
        Self { path, entries }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value under `key`, or the default when it is absent or malformed.
    #[must_use]
    pub fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(value) = self.entries.get(key) else {
            return T::default();
        };
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Corrupt stored value, using default");
            T::default()
        })
    }

    /// Replace the value under `key` and write the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value cannot be serialized or written.
    pub fn set<T: Serialize>(&mut self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(value).map_err(|source| StoreError::Serialize { key, source })?;
        self.entries.insert(key.to_string(), value);
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Serialize {
                key: "storage",
                source,
            }
        })?;

        // Write a sibling file, then rename over the store
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        self.get(CART_KEY)
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    pub fn save_cart(&mut self, cart: &Cart) -> Result<(), StoreError> {
        self.set(CART_KEY, cart)
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.get(ORDERS_KEY)
    }

    /// Append an order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    pub fn push_order(&mut self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders();
        orders.push(order);
        self.set(ORDERS_KEY, &orders)
    }

    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences {
            theme: self.get::<Theme>(THEME_KEY),
            language: self.get::<Language>(LANGUAGE_KEY),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be written.
    pub fn save_preferences(&mut self, preferences: Preferences) -> Result<(), StoreError> {
        self.entries.insert(
            THEME_KEY.to_string(),
            Value::String(preferences.theme.to_string()),
        );
        self.set(LANGUAGE_KEY, &preferences.language)
    }
}

/// Move a damaged store aside so the next save cannot destroy it.
fn preserve_corrupt(path: &Path) {
    let backup = path.with_extension(CORRUPT_EXTENSION);
    match fs::rename(path, &backup) {
        Ok(()) => tracing::warn!(backup = %backup.display(), "Kept corrupt store"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to keep corrupt store"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use retropost_core::{Customization, CustomerInfo, Email, Template, TemplateId};

    use super::*;

    fn template() -> Template {
        Template {
            id: TemplateId::new("1"),
            name: "Tropska Plaža".to_string(),
            image: "https://example.com/bg.jpg".to_string(),
            category: "priroda".to_string(),
            description: String::new(),
            price: None,
        }
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        assert!(store.cart().is_empty());
        assert!(store.orders().is_empty());
        assert_eq!(store.preferences(), Preferences::default());
    }

    #[test]
    fn test_cart_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        let mut cart = store.cart();
        cart.add(template(), Customization::default(), None, None);
        cart.add(template(), Customization::default(), None, None);
        store.save_cart(&cart).unwrap();

        let reopened = LocalStore::open(dir.path());
        assert_eq!(reopened.cart(), cart);
        assert_eq!(reopened.cart().item_count(), 2);
    }

    #[test]
    fn test_checkout_flow_persists_order_and_empties_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        let mut cart = store.cart();
        cart.add(template(), Customization::default(), None, None);

        let order = cart
            .checkout(CustomerInfo {
                name: "Ana".to_string(),
                email: Email::parse("ana@example.hr").unwrap(),
                phone: None,
            })
            .unwrap();
        store.push_order(order.clone()).unwrap();
        store.save_cart(&cart).unwrap();

        let reopened = LocalStore::open(dir.path());
        assert!(reopened.cart().is_empty());
        assert_eq!(reopened.orders(), vec![order]);
    }

    #[test]
    fn test_preferences_use_separate_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path());
        store
            .save_preferences(Preferences {
                theme: Theme::Dark,
                language: Language::En,
            })
            .unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw[THEME_KEY], "dark");
        assert_eq!(raw[LANGUAGE_KEY], "en");
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FILE_NAME), "{not json").unwrap();

        let mut store = LocalStore::open(dir.path());
        assert!(store.cart().is_empty());

        // Writing replaces the damaged file.
        store.save_cart(&Cart::new()).unwrap();
        assert!(LocalStore::open(dir.path()).entries.contains_key(CART_KEY));
    }

    #[test]
    fn test_corrupt_file_is_kept_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let raw = r#"{"retropost_orders": [{"id": "#;
        fs::write(dir.path().join(FILE_NAME), raw).unwrap();

        let mut store = LocalStore::open(dir.path());
        store.save_cart(&Cart::new()).unwrap();

        let backup = dir.path().join("storage.json.corrupt");
        assert_eq!(fs::read_to_string(backup).unwrap(), raw);
        assert!(LocalStore::open(dir.path()).entries.contains_key(CART_KEY));
    }

    #[test]
    fn test_corrupt_value_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILE_NAME),
            r#"{"retropost_cart": "oops", "retropost_theme": "dark"}"#,
        )
        .unwrap();

        let store = LocalStore::open(dir.path());
        assert!(store.cart().is_empty());
        assert_eq!(store.preferences().theme, Theme::Dark);
    }
}
