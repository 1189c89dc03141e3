//! Preference resolution.
//!
//! Three signals decide what the banner looks like: the recorded consent,
//! the stored theme preference, and the OS color scheme. [`resolve`] folds
//! them into a single [`ResolvedState`]. It is a pure function; the lifecycle
//! controller calls it whenever any input changes and never caches the result.
//!
//! ```rust
//! use consent_banner::preference::{resolve, ConsentState, EffectiveTheme, ThemePreference};
//!
//! let state = resolve(ConsentState::Unknown, ThemePreference::System, true);
//! assert!(state.visible);
//! assert_eq!(state.effective_theme, EffectiveTheme::Dark);
//!
//! let state = resolve(ConsentState::Accepted, ThemePreference::Light, true);
//! assert!(!state.visible);
//! assert_eq!(state.effective_theme, EffectiveTheme::Light);
//! ```
//!
//! ## Parsing stored values
//!
//! Stored values come from a medium the banner does not control. Parsing
//! never fails: anything other than an exact acceptance marker is
//! [`ConsentState::Unknown`], and any theme value other than `dark`/`light`
//! is [`ThemePreference::System`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::CONSENT_ACCEPTED;

/// The visitor's recorded decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentState {
    /// No decision recorded.
    #[default]
    Unknown,
    /// The visitor accepted. Never reverts.
    Accepted,
}

impl ConsentState {
    /// Interprets a raw value read from the consent key.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(v) if v == CONSENT_ACCEPTED => ConsentState::Accepted,
            _ => ConsentState::Unknown,
        }
    }

    pub fn is_accepted(self) -> bool {
        self == ConsentState::Accepted
    }
}

/// The visitor's theme choice as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    Light,
    Dark,
    /// Follow the OS.
    #[default]
    System,
}

impl ThemePreference {
    /// Interprets a raw stored or attribute value.
    ///
    /// Absent, empty, `system` and unrecognized values all mean
    /// [`ThemePreference::System`].
    pub fn from_stored(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return ThemePreference::System;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "dark" => ThemePreference::Dark,
            "light" => ThemePreference::Light,
            "" | "system" => ThemePreference::System,
            other => {
                debug!(value = other, "unrecognized theme preference, following the OS");
                ThemePreference::System
            }
        }
    }

    /// Whether the visitor picked a theme rather than deferring to the OS.
    pub fn is_explicit(self) -> bool {
        self != ThemePreference::System
    }

    /// Stored spelling of this preference; `None` for `System`.
    pub fn as_stored(self) -> Option<&'static str> {
        match self {
            ThemePreference::Light => Some("light"),
            ThemePreference::Dark => Some("dark"),
            ThemePreference::System => None,
        }
    }

    /// This preference if explicit, otherwise `fallback`.
    pub fn or(self, fallback: ThemePreference) -> ThemePreference {
        if self.is_explicit() {
            self
        } else {
            fallback
        }
    }
}

/// The theme actually rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveTheme {
    #[default]
    Light,
    Dark,
}

impl EffectiveTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectiveTheme::Light => "light",
            EffectiveTheme::Dark => "dark",
        }
    }
}

impl fmt::Display for EffectiveTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedState {
    pub visible: bool,
    pub effective_theme: EffectiveTheme,
}

/// Folds consent, theme preference and the OS signal into a render state.
///
/// - `visible` is `false` exactly when consent is accepted.
/// - The theme is dark for an explicit dark preference, or for `System`
///   while the OS prefers dark; light otherwise.
pub fn resolve(consent: ConsentState, theme_pref: ThemePreference, os_is_dark: bool) -> ResolvedState {
    let dark = match theme_pref {
        ThemePreference::Dark => true,
        ThemePreference::Light => false,
        ThemePreference::System => os_is_dark,
    };
    ResolvedState {
        visible: !consent.is_accepted(),
        effective_theme: if dark {
            EffectiveTheme::Dark
        } else {
            EffectiveTheme::Light
        },
    }
}
