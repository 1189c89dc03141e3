//! The renderer's input and output types.

use serde::{Deserialize, Serialize};

use crate::locale::TranslationEntry;
use crate::preference::EffectiveTheme;

use super::palette::Palette;

/// Identifies one rendered accept control.
///
/// Every render gets a fresh id from the lifecycle controller. Only the
/// control of the most recent render is attached; activating an older one
/// does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ControlId(u64);

impl ControlId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The id that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// An informational link (privacy policy, terms).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// The single actionable control of a rendered banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptControl {
    id: ControlId,
    label: String,
}

impl AcceptControl {
    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Everything [`render`](super::render) needs, borrowed.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub theme: EffectiveTheme,
    pub palette: &'a Palette,
    pub locale: &'a str,
    pub text: &'a TranslationEntry,
    pub links: &'a [Link],
    pub control: ControlId,
}

/// A rendered banner, as plain data.
///
/// Turn it into HTML with [`to_markup`](Self::to_markup), or serialize it
/// for a host that builds its own view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedOutput {
    theme: EffectiveTheme,
    palette: Palette,
    locale: String,
    message: String,
    links: Vec<Link>,
    accept: AcceptControl,
}

impl RenderedOutput {
    pub(super) fn from_input(input: &RenderInput<'_>) -> Self {
        Self {
            theme: input.theme,
            palette: input.palette.clone(),
            locale: input.locale.to_string(),
            message: input.text.message.clone(),
            links: input.links.to_vec(),
            accept: AcceptControl {
                id: input.control,
                label: input.text.button.clone(),
            },
        }
    }

    pub fn theme(&self) -> EffectiveTheme {
        self.theme
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Locale the text was taken from (after fallback).
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn button_label(&self) -> &str {
        &self.accept.label
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn accept_control(&self) -> &AcceptControl {
        &self.accept
    }

    /// Replaces the theme-dependent part only; text, links and the accept
    /// control stay as they are.
    pub fn apply_theme(&mut self, theme: EffectiveTheme, palette: &Palette) {
        self.theme = theme;
        if &self.palette != palette {
            self.palette = palette.clone();
        }
    }
}
