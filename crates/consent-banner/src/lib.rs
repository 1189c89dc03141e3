//! # Consent Banner - Embeddable Cookie Consent
//!
//! `consent-banner` is the state machine behind a cookie consent banner: it
//! decides whether the banner shows, which theme it uses, what language it
//! speaks, and records consent when the visitor accepts.
//!
//! The banner keeps no state of its own across page loads. It reads two keys
//! from a persistent [`KeyValueStore`], follows the OS color scheme through a
//! [`ColorSchemeSource`], and converges when another tab or window writes to
//! the same store.
//!
//! ## Core Concepts
//!
//! - [`Banner`]: the lifecycle controller (mount, re-render, accept, unmount)
//! - [`resolve`]: pure mapping from consent, theme preference and OS signal to
//!   visibility and effective theme
//! - [`render`]: pure mapping from resolved state, locale and links to a
//!   [`RenderedOutput`]
//! - [`TranslationTable`]: locale lookup with default fallback
//! - [`BannerConfig`]: store keys, links, palettes and extra translations
//!
//! ## Quick Start
//!
//! ```rust
//! use consent_banner::{Banner, EffectiveTheme, LifecycleState, ManualColorScheme, SharedStorage};
//!
//! // Two tabs sharing one origin's storage.
//! let storage = SharedStorage::new();
//! let os = ManualColorScheme::dark();
//!
//! let mut first = Banner::new(storage.open_context(), &os);
//! let mut second = Banner::new(storage.open_context(), &os);
//! first.mount();
//! second.mount();
//! assert_eq!(first.effective_theme(), EffectiveTheme::Dark);
//!
//! // Accepting in one tab removes the banner in the other.
//! first.accept();
//! second.pump();
//! assert_eq!(second.state(), LifecycleState::Removed);
//! ```
//!
//! ## Markup
//!
//! [`RenderedOutput`] is plain data. [`RenderedOutput::to_markup`] turns it
//! into HTML through a MiniJinja template; [`MarkupEngine::with_template`]
//! accepts a custom one.
//!
//! ## Backends
//!
//! | Store | Cross-context notifications |
//! |-------|-----------------------------|
//! | [`MemoryStore`] | yes, between contexts of one [`SharedStorage`] |
//! | [`FileStore`] | no |
//! | [`UnavailableStore`] | no, every call fails |
//!
//! | Color scheme | Notifications |
//! |--------------|---------------|
//! | [`OsColorScheme`] | on [`OsColorScheme::refresh`] |
//! | [`ManualColorScheme`] | on [`ManualColorScheme::set_prefers_dark`] |
//! | [`NoColorScheme`] | none, always unsupported |

pub mod banner;
pub mod config;
pub mod error;
pub mod locale;
pub mod notify;
pub mod prelude;
pub mod preference;
pub mod render;
pub mod scheme;
pub mod store;

// Lifecycle
pub use banner::{Banner, BannerEvent, LifecycleState, RenderStats, LANG_ATTRIBUTE, THEME_ATTRIBUTE};

// Configuration and errors
pub use config::{BannerConfig, Links, DEFAULT_CONSENT_KEY, DEFAULT_THEME_KEY};
pub use error::{BannerError, StoreError};

// State resolution
pub use preference::{resolve, ConsentState, EffectiveTheme, ResolvedState, ThemePreference};

// Presentation
pub use locale::{LocalizedText, TranslationEntry, TranslationTable, DEFAULT_LOCALE};
pub use render::{
    render, AcceptControl, ControlId, Link, MarkupEngine, Palette, PaletteSet, RenderInput,
    RenderedOutput,
};

// Collaborators
pub use notify::{ContextId, Notifier, Subscription, SubscriptionId};
pub use scheme::{ColorSchemeChange, ColorSchemeSource, ManualColorScheme, NoColorScheme, OsColorScheme};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, SharedStorage, StoreChange, UnavailableStore,
    CONSENT_ACCEPTED,
};
