//! Light and dark palettes.
//!
//! The banner has exactly two looks. Unlike a general theme system there is
//! nothing to merge: a [`PaletteSet`] holds one complete [`Palette`] per
//! [`EffectiveTheme`], and the renderer picks one.
//!
//! Palettes can be overridden from YAML:
//!
//! ```rust
//! use consent_banner::render::PaletteSet;
//!
//! let palettes: PaletteSet = serde_yaml::from_str(r##"
//! dark:
//!   background: "#101010"
//!   foreground: "#eeeeee"
//!   button_background: "#eeeeee"
//!   button_foreground: "#101010"
//! "##).unwrap();
//!
//! assert_eq!(palettes.dark.background, "#101010");
//! assert_eq!(palettes.light.background, "#f9f9f9");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BannerError;
use crate::preference::EffectiveTheme;

/// Colors for one theme, as CSS color values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub background: String,
    pub foreground: String,
    pub button_background: String,
    pub button_foreground: String,
}

impl Palette {
    /// Light background, dark text, dark button.
    pub fn light() -> Self {
        Self {
            background: "#f9f9f9".into(),
            foreground: "#000".into(),
            button_background: "#000".into(),
            button_foreground: "#fff".into(),
        }
    }

    /// Dark background, light text, light button.
    pub fn dark() -> Self {
        Self {
            background: "#222".into(),
            foreground: "#fff".into(),
            button_background: "#fff".into(),
            button_foreground: "#000".into(),
        }
    }

    /// Rejects values that could escape a CSS declaration.
    pub fn validate(&self) -> Result<(), BannerError> {
        let values = [
            ("background", &self.background),
            ("foreground", &self.foreground),
            ("button_background", &self.button_background),
            ("button_foreground", &self.button_foreground),
        ];
        for (name, value) in values {
            let value = value.trim();
            if value.is_empty() {
                return Err(BannerError::config(format!("palette color '{}' is empty", name)));
            }
            if value.contains([';', '"', '\'', '<', '>', '{', '}']) {
                return Err(BannerError::config(format!(
                    "palette color '{}' has invalid value '{}'",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One palette per effective theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteSet {
    pub light: Palette,
    pub dark: Palette,
}

impl PaletteSet {
    /// The palette to render `theme` with.
    pub fn for_theme(&self, theme: EffectiveTheme) -> &Palette {
        match theme {
            EffectiveTheme::Light => &self.light,
            EffectiveTheme::Dark => &self.dark,
        }
    }

    pub fn validate(&self) -> Result<(), BannerError> {
        self.light.validate()?;
        self.dark.validate()
    }
}

impl Default for PaletteSet {
    fn default() -> Self {
        Self {
            light: Palette::light(),
            dark: Palette::dark(),
        }
    }
}
