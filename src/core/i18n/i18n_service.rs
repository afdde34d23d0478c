// Locale string table - keyed warning texts for user-facing replies.
//
// Components register entries per locale at startup; lookups fall back from
// the requested locale to the default locale, and finally to the key itself
// so a missing entry is visible instead of silent.

use dashmap::DashMap;
use std::collections::HashMap;

pub struct StringTable {
    default_locale: String,
    tables: DashMap<String, HashMap<String, String>>,
}

impl StringTable {
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            tables: DashMap::new(),
        }
    }

    /// Register entries for a locale. Later definitions win, so callers can
    /// override the built-in texts from configuration.
    pub fn define<K, V>(&self, locale: &str, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = self.tables.entry(locale.to_string()).or_insert_with(HashMap::new);
        for (key, value) in entries {
            table.insert(key.into(), value.into());
        }
    }

    /// Resolve a key for a locale, falling back to the default locale and
    /// then to the key itself.
    pub fn resolve(&self, locale: &str, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(&self.default_locale, key))
            .unwrap_or_else(|| key.to_string())
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        self.tables
            .get(locale)
            .and_then(|table| table.get(key).cloned())
    }
}

// ============================================================================
// TESTS
// ============================================================================
