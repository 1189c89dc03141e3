//! Translated banner text.
//!
//! A [`TranslationTable`] maps locale tags to a [`TranslationEntry`] (the
//! message and the accept button label). Tables are immutable once built and
//! always contain their default locale, so a lookup can never come back empty:
//!
//! 1. exact tag, case-insensitive (`FR` finds `fr`)
//! 2. primary subtag (`fr-CA` finds `fr`)
//! 3. the default locale
//!
//! The built-in table ([`TranslationTable::builtin`]) is process-wide and
//! covers English, French and Spanish.
//!
//! ```rust
//! use consent_banner::locale::TranslationTable;
//!
//! let table = TranslationTable::builtin();
//! let text = table.lookup(Some("de"));
//! assert_eq!(text.locale, "en");
//! assert_eq!(text.entry.button, "Accept");
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BannerError;

/// Locale used when nothing else matches.
pub const DEFAULT_LOCALE: &str = "en";

/// Message and button label for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub message: String,
    #[serde(alias = "button_label")]
    pub button: String,
}

impl TranslationEntry {
    pub fn new(message: impl Into<String>, button: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            button: button.into(),
        }
    }
}

/// Result of a lookup: the locale that matched and its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalizedText<'a> {
    pub locale: &'a str,
    pub entry: &'a TranslationEntry,
}

static BUILTIN: Lazy<TranslationTable> = Lazy::new(|| {
    TranslationTable::new(
        DEFAULT_LOCALE,
        TranslationEntry::new("We use cookies to improve your experience.", "Accept"),
    )
    .with_entry(
        "fr",
        TranslationEntry::new(
            "Nous utilisons des cookies pour améliorer votre expérience.",
            "Accepter",
        ),
    )
    .with_entry(
        "es",
        TranslationEntry::new("Usamos cookies para mejorar su experiencia.", "Aceptar"),
    )
});

/// Locale-keyed banner text with a guaranteed default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    default_locale: String,
    entries: BTreeMap<String, TranslationEntry>,
}

impl TranslationTable {
    /// The built-in English/French/Spanish table.
    pub fn builtin() -> &'static TranslationTable {
        &BUILTIN
    }

    /// Creates a table holding only its default locale.
    pub fn new(default_locale: &str, default_entry: TranslationEntry) -> Self {
        let default_locale = normalize(default_locale);
        let mut entries = BTreeMap::new();
        entries.insert(default_locale.clone(), default_entry);
        Self {
            default_locale,
            entries,
        }
    }

    /// Adds or replaces `locale`, returning `self` for chaining.
    pub fn with_entry(mut self, locale: &str, entry: TranslationEntry) -> Self {
        self.insert(locale, entry);
        self
    }

    /// Adds or replaces `locale`.
    pub fn insert(&mut self, locale: &str, entry: TranslationEntry) {
        self.entries.insert(normalize(locale), entry);
    }

    /// Overlays every entry of `other` onto this table.
    pub fn merge(&mut self, other: &BTreeMap<String, TranslationEntry>) {
        for (locale, entry) in other {
            self.insert(locale, entry.clone());
        }
    }

    /// Parses a YAML mapping of locale to entry.
    ///
    /// ```yaml
    /// en:
    ///   message: We use cookies.
    ///   button: OK
    /// de:
    ///   message: Wir verwenden Cookies.
    ///   button: Akzeptieren
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if the YAML is malformed or lacks `default_locale`.
    pub fn from_yaml(yaml: &str, default_locale: &str) -> Result<Self, BannerError> {
        let raw: BTreeMap<String, TranslationEntry> = serde_yaml::from_str(yaml)?;
        Self::from_entries(raw, default_locale)
    }

    /// Builds a table from `entries`, which must contain `default_locale`.
    pub fn from_entries(
        entries: BTreeMap<String, TranslationEntry>,
        default_locale: &str,
    ) -> Result<Self, BannerError> {
        let default_key = normalize(default_locale);
        let mut normalized: BTreeMap<String, TranslationEntry> = entries
            .into_iter()
            .map(|(locale, entry)| (normalize(&locale), entry))
            .collect();
        let default_entry = normalized.remove(&default_key).ok_or_else(|| {
            BannerError::config(format!(
                "translations do not include the default locale '{}'",
                default_key
            ))
        })?;

        let mut table = Self::new(&default_key, default_entry);
        for (locale, entry) in normalized {
            table.entries.insert(locale, entry);
        }
        Ok(table)
    }

    /// The fallback locale.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Every entry, keyed by normalized locale tag.
    pub fn entries(&self) -> &BTreeMap<String, TranslationEntry> {
        &self.entries
    }

    /// Every locale in the table, sorted.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whether `locale` has its own entry (no fallback).
    pub fn contains(&self, locale: &str) -> bool {
        self.entries.contains_key(&normalize(locale))
    }

    /// Finds the text for `requested`, falling back as described in the
    /// module docs. Never fails.
    pub fn lookup(&self, requested: Option<&str>) -> LocalizedText<'_> {
        if let Some(tag) = requested.map(normalize).filter(|t| !t.is_empty()) {
            if let Some((locale, entry)) = self.entries.get_key_value(&tag) {
                return LocalizedText { locale, entry };
            }
            if let Some(primary) = tag.split('-').next() {
                if let Some((locale, entry)) = self.entries.get_key_value(primary) {
                    return LocalizedText { locale, entry };
                }
            }
            debug!(requested = %tag, fallback = %self.default_locale, "locale not translated");
        }
        self.default_text()
    }

    fn default_text(&self) -> LocalizedText<'_> {
        match self.entries.get_key_value(&self.default_locale) {
            Some((locale, entry)) => LocalizedText { locale, entry },
            // Every constructor inserts the default locale and nothing removes it.
            None => unreachable!("translation table lost its default locale"),
        }
    }
}

fn normalize(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}
