//! HTML markup for a rendered banner.
//!
//! [`MarkupEngine`] turns a [`RenderedOutput`] into the banner's markup: a
//! container with a message region, the informational links, and exactly one
//! accept button. The palette is emitted as CSS custom properties on the
//! container, so a theme change only touches the `style` and `data-theme`
//! attributes.
//!
//! The template is MiniJinja with HTML auto-escaping always on. Hosts can
//! supply their own template with [`MarkupEngine::with_template`]; it receives
//! the serialized [`RenderedOutput`] plus `stylesheet`.
//!
//! ```rust
//! use consent_banner::render::{render, ControlId, Link, MarkupEngine, Palette, RenderInput};
//! use consent_banner::locale::TranslationTable;
//! use consent_banner::preference::EffectiveTheme;
//!
//! let text = TranslationTable::builtin().lookup(Some("en"));
//! let output = render(&RenderInput {
//!     theme: EffectiveTheme::Light,
//!     palette: &Palette::light(),
//!     locale: text.locale,
//!     text: text.entry,
//!     links: &[Link::new("Privacy Policy", "https://example.com/privacy")],
//!     control: ControlId::new(1),
//! });
//!
//! let html = MarkupEngine::new().render(&output).unwrap();
//! assert!(html.contains("We use cookies to improve your experience."));
//! assert_eq!(html.matches("<button").count(), 1);
//! ```

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, Value};
use once_cell::sync::Lazy;

use crate::error::BannerError;

use super::output::RenderedOutput;

const TEMPLATE_NAME: &str = "banner.html";

/// Layout rules shared by both themes; colors come from custom properties.
pub const STYLESHEET: &str = r#":host {
  position: fixed;
  bottom: 0;
  width: 100%;
  z-index: 10000;
  font-family: sans-serif;
}
.banner {
  background: var(--banner-bg);
  color: var(--banner-fg);
  padding: 12px 20px;
  display: flex;
  justify-content: space-between;
  align-items: center;
  box-shadow: 0 -2px 6px rgba(0,0,0,0.1);
}
.banner-links a {
  margin-right: 10px;
  color: inherit;
  text-decoration: underline;
}
#accept {
  background: var(--button-bg);
  color: var(--button-fg);
  border: none;
  padding: 8px 14px;
  border-radius: 6px;
  cursor: pointer;
  font-weight: bold;
}"#;

/// Default banner template.
pub const BANNER_TEMPLATE: &str = r#"<style>{{ stylesheet }}</style>
<div class="banner" data-theme="{{ theme }}" lang="{{ locale }}" role="region" aria-label="cookie consent" style="--banner-bg: {{ palette.background }}; --banner-fg: {{ palette.foreground }}; --button-bg: {{ palette.button_background }}; --button-fg: {{ palette.button_foreground }};">
  <div class="banner-message">{{ message }}</div>
  <div class="banner-links">
{%- for link in links %}
    <a href="{{ link.href }}" target="_blank" rel="noopener">{{ link.label }}</a>
{%- endfor %}
  </div>
  <button id="accept" type="button" data-control="{{ accept.id }}">{{ accept.label }}</button>
</div>
"#;

static DEFAULT_ENGINE: Lazy<MarkupEngine> = Lazy::new(MarkupEngine::new);

/// MiniJinja-backed markup generator.
pub struct MarkupEngine {
    env: Environment<'static>,
}

impl MarkupEngine {
    /// Creates an engine using [`BANNER_TEMPLATE`].
    pub fn new() -> Self {
        Self {
            env: banner_environment(),
        }
    }

    /// Process-wide engine with the default template.
    pub fn shared() -> &'static MarkupEngine {
        &DEFAULT_ENGINE
    }

    /// Creates an engine using a host-supplied template.
    ///
    /// # Errors
    ///
    /// Fails if the template does not compile.
    pub fn with_template(source: impl Into<String>) -> Result<Self, BannerError> {
        let mut env = banner_environment();
        env.add_template_owned(TEMPLATE_NAME, source.into())?;
        Ok(Self { env })
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Renders `output` to HTML.
    pub fn render(&self, output: &RenderedOutput) -> Result<String, BannerError> {
        let mut ctx: BTreeMap<String, Value> = BTreeMap::new();
        if let serde_json::Value::Object(map) = serde_json::to_value(output)? {
            for (key, value) in map {
                ctx.insert(key, Value::from_serialize(&value));
            }
        }
        ctx.insert(
            "stylesheet".to_string(),
            Value::from_safe_string(STYLESHEET.to_string()),
        );

        // A host template is registered by name; the default one is compiled on use.
        match self.env.get_template(TEMPLATE_NAME) {
            Ok(template) => Ok(template.render(&ctx)?),
            Err(_) => Ok(self
                .env
                .render_named_str(TEMPLATE_NAME, BANNER_TEMPLATE, &ctx)?),
        }
    }
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MarkupEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkupEngine")
            .field("custom_template", &self.env.get_template(TEMPLATE_NAME).is_ok())
            .finish()
    }
}

fn banner_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

impl RenderedOutput {
    /// Renders this output with the default template.
    pub fn to_markup(&self) -> Result<String, BannerError> {
        MarkupEngine::shared().render(self)
    }
}
