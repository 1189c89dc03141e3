//! Banner configuration.
//!
//! Everything about a banner that is fixed for its lifetime: the two store
//! keys, the default locale, the informational links, the palettes and any
//! extra translations. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```rust
//! use consent_banner::config::BannerConfig;
//!
//! let config = BannerConfig::from_yaml(r#"
//! consent_key: siteConsent
//! links:
//!   privacy:
//!     label: Privacy
//!     href: https://example.com/privacy
//! translations:
//!   de:
//!     message: Wir verwenden Cookies.
//!     button: Akzeptieren
//! "#).unwrap();
//!
//! assert_eq!(config.consent_key, "siteConsent");
//! assert_eq!(config.theme_key, "theme");
//! assert_eq!(config.links.terms.label, "Terms and Conditions");
//! assert_eq!(config.translation_table().unwrap().lookup(Some("de")).entry.button, "Akzeptieren");
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BannerError;
use crate::locale::{TranslationEntry, TranslationTable, DEFAULT_LOCALE};
use crate::render::{Link, PaletteSet};

/// Store key holding the consent flag.
pub const DEFAULT_CONSENT_KEY: &str = "cookiesAccepted";

/// Store key holding the theme preference.
pub const DEFAULT_THEME_KEY: &str = "theme";

/// The two informational links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Links {
    pub privacy: Link,
    pub terms: Link,
}

impl Links {
    pub fn to_vec(&self) -> Vec<Link> {
        vec![self.privacy.clone(), self.terms.clone()]
    }
}

impl Default for Links {
    fn default() -> Self {
        Self {
            privacy: Link::new("Privacy Policy", "https://www.tehveli.com/privacy"),
            terms: Link::new("Terms and Conditions", "https://www.tehveli.com/terms"),
        }
    }
}

/// Construction-time settings of a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub consent_key: String,
    pub theme_key: String,
    pub default_locale: String,
    pub links: Links,
    pub palettes: PaletteSet,
    /// Entries merged over the built-in table.
    pub translations: BTreeMap<String, TranslationEntry>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            consent_key: DEFAULT_CONSENT_KEY.to_string(),
            theme_key: DEFAULT_THEME_KEY.to_string(),
            default_locale: DEFAULT_LOCALE.to_string(),
            links: Links::default(),
            palettes: PaletteSet::default(),
            translations: BTreeMap::new(),
        }
    }
}

impl BannerConfig {
    /// Parses and validates a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, BannerError> {
        let config: BannerConfig = if yaml.trim().is_empty() {
            BannerConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BannerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| BannerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Checks the semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), BannerError> {
        if self.consent_key.trim().is_empty() {
            return Err(BannerError::config("consent_key must not be empty"));
        }
        if self.theme_key.trim().is_empty() {
            return Err(BannerError::config("theme_key must not be empty"));
        }
        if self.consent_key == self.theme_key {
            return Err(BannerError::config(format!(
                "consent_key and theme_key are both '{}'",
                self.consent_key
            )));
        }
        for link in [&self.links.privacy, &self.links.terms] {
            if link.href.trim().is_empty() {
                return Err(BannerError::config(format!(
                    "link '{}' has no href",
                    link.label
                )));
            }
        }
        self.palettes.validate()?;
        self.translation_table().map(|_| ())
    }

    /// The built-in translations with this configuration's entries merged in.
    ///
    /// # Errors
    ///
    /// Fails when `default_locale` has no entry after merging.
    pub fn translation_table(&self) -> Result<TranslationTable, BannerError> {
        let mut entries = TranslationTable::builtin().entries().clone();
        for (locale, entry) in &self.translations {
            entries.insert(locale.trim().to_ascii_lowercase(), entry.clone());
        }
        TranslationTable::from_entries(entries, &self.default_locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BannerConfig::default();
        assert_eq!(config.consent_key, "cookiesAccepted");
        assert_eq!(config.theme_key, "theme");
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.links.privacy.href, "https://www.tehveli.com/privacy");
        assert_eq!(config.links.terms.href, "https://www.tehveli.com/terms");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(BannerConfig::from_yaml("").unwrap(), BannerConfig::default());
        assert_eq!(BannerConfig::from_yaml("{}").unwrap(), BannerConfig::default());
    }

    #[test]
    fn test_rejects_shared_keys() {
        let err = BannerConfig::from_yaml("consent_key: prefs\ntheme_key: prefs\n").unwrap_err();
        assert!(matches!(err, BannerError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_default_locale() {
        let err = BannerConfig::from_yaml("default_locale: it\n").unwrap_err();
        assert!(err.to_string().contains("'it'"));
    }

    #[test]
    fn test_default_locale_from_extra_translations() {
        let config = BannerConfig::from_yaml(
            "default_locale: it\ntranslations:\n  it:\n    message: Usiamo i cookie.\n    button: Accetta\n",
        )
        .unwrap();
        let table = config.translation_table().unwrap();
        assert_eq!(table.default_locale(), "it");
        assert_eq!(table.lookup(Some("de")).entry.button, "Accetta");
        assert_eq!(table.lookup(Some("fr")).entry.button, "Accepter");
    }

    #[test]
    fn test_rejects_bad_palette() {
        let yaml = r##"
palettes:
  dark:
    background: "red; x: y"
    foreground: "#fff"
    button_background: "#fff"
    button_foreground: "#000"
"##;
        assert!(BannerConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        let err = BannerConfig::from_yaml("consent_key: [").unwrap_err();
        assert!(matches!(err, BannerError::Yaml(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("banner.yaml");
        std::fs::write(&path, "theme_key: colorScheme\n").unwrap();

        let config = BannerConfig::from_file(&path).unwrap();
        assert_eq!(config.theme_key, "colorScheme");
    }

    #[test]
    fn test_from_missing_file() {
        let err = BannerConfig::from_file("/nonexistent/banner.yaml").unwrap_err();
        assert!(matches!(err, BannerError::Io { .. }));
    }
}
