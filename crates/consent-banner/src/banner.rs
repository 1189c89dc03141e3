//! The lifecycle controller.
//!
//! [`Banner`] is an explicit state machine. The host drives it with a few
//! calls ([`mount`](Banner::mount), [`set_attribute`](Banner::set_attribute),
//! [`pump`](Banner::pump), [`unmount`](Banner::unmount)) and the visitor with
//! one ([`activate`](Banner::activate)). Each call is turned into a
//! [`BannerEvent`] and handled by [`dispatch`](Banner::dispatch), which
//! decides what changed and whether to re-render all of the banner, only its
//! theme, or nothing.
//!
//! ```text
//!               mount (consent already given)
//!   Unmounted ─────────────────────────────────► MountedSuppressed
//!      │  ▲                                            │
//!      │  │ unmount                                    │ unmount
//!      │  └────────────────────────────────────────────┘
//!      │ mount
//!      ▼
//!   MountedVisible ──── accept (here or in another context) ───► Removed
//!      │  ▲
//!      └──┘ lang / theme / OS scheme / store changes
//! ```
//!
//! ## Subscriptions
//!
//! A visible banner subscribes once to the store's cross-context changes and
//! once to the OS color scheme. Mounting again does not subscribe again. A
//! suppressed banner subscribes to nothing. Leaving the visible state drops
//! both subscriptions.
//!
//! Notifications queue on the subscriptions until the host calls
//! [`pump`](Banner::pump); each is handled to completion before the next.
//!
//! ## Degradation
//!
//! Nothing here fails. An unreadable store reads as empty, an unsupported
//! OS signal reads as light, an untranslated locale falls back to the default
//! one, and a failed consent write is logged while the banner still goes away.
//!
//! ```rust
//! use consent_banner::banner::{Banner, LifecycleState};
//! use consent_banner::scheme::ManualColorScheme;
//! use consent_banner::store::{KeyValueStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let mut banner = Banner::new(store.clone(), ManualColorScheme::light());
//!
//! banner.mount();
//! assert_eq!(banner.state(), LifecycleState::MountedVisible);
//! assert_eq!(banner.output().unwrap().button_label(), "Accept");
//!
//! let control = banner.output().unwrap().accept_control().id();
//! banner.activate(control);
//!
//! assert_eq!(banner.state(), LifecycleState::Removed);
//! assert_eq!(store.get("cookiesAccepted").unwrap().as_deref(), Some("true"));
//! ```

use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::BannerConfig;
use crate::error::BannerError;
use crate::locale::TranslationTable;
use crate::notify::Subscription;
use crate::preference::{resolve, ConsentState, EffectiveTheme, ResolvedState, ThemePreference};
use crate::render::{render, ControlId, Link, RenderInput, RenderedOutput};
use crate::scheme::{ColorSchemeChange, ColorSchemeSource};
use crate::store::{KeyValueStore, StoreChange, CONSENT_ACCEPTED};

/// Attribute carrying the locale tag.
pub const LANG_ATTRIBUTE: &str = "lang";

/// Attribute carrying an explicit theme override.
pub const THEME_ATTRIBUTE: &str = "theme";

/// Where a banner is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Not attached to a host page.
    Unmounted,
    /// Attached, rendered, listening for changes.
    MountedVisible,
    /// Attached while consent was already given: no output, no subscriptions.
    MountedSuppressed,
    /// Consent was given while visible. Terminal.
    Removed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Unmounted => write!(f, "unmounted"),
            LifecycleState::MountedVisible => write!(f, "mounted-visible"),
            LifecycleState::MountedSuppressed => write!(f, "mounted-suppressed"),
            LifecycleState::Removed => write!(f, "removed"),
        }
    }
}

/// Something that happened to a banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BannerEvent {
    /// The host set (`Some`) or removed (`None`) an attribute.
    AttributeChanged { name: String, value: Option<String> },
    /// The OS color scheme flipped.
    ColorSchemeChanged(ColorSchemeChange),
    /// Another execution context wrote to the store.
    StoreChanged(StoreChange),
    /// The visitor activated an accept control.
    AcceptActivated(ControlId),
}

impl BannerEvent {
    pub fn attribute(name: impl Into<String>, value: Option<&str>) -> Self {
        BannerEvent::AttributeChanged {
            name: name.into(),
            value: value.map(str::to_string),
        }
    }
}

/// Counters describing how often the banner produced output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Full renders (content, links and a fresh accept control).
    pub full_renders: usize,
    /// Theme-only updates applied to existing output.
    pub theme_updates: usize,
}

/// A consent banner bound to a store and an OS color-scheme source.
pub struct Banner<S, C> {
    store: S,
    scheme: C,
    config: BannerConfig,
    translations: TranslationTable,
    links: Vec<Link>,
    state: LifecycleState,
    consent: ConsentState,
    lang: Option<String>,
    theme_attribute: ThemePreference,
    stored_theme: ThemePreference,
    os_dark: bool,
    output: Option<RenderedOutput>,
    attached: Option<ControlId>,
    last_control: ControlId,
    store_changes: Option<Subscription<StoreChange>>,
    scheme_changes: Option<Subscription<ColorSchemeChange>>,
    stats: RenderStats,
}

impl<S: KeyValueStore, C: ColorSchemeSource> Banner<S, C> {
    /// Creates an unmounted banner with the default configuration.
    pub fn new(store: S, scheme: C) -> Self {
        let config = BannerConfig::default();
        let translations = TranslationTable::builtin().clone();
        Self::assemble(store, scheme, config, translations)
    }

    /// Creates an unmounted banner with `config`.
    ///
    /// # Errors
    ///
    /// Fails if `config` does not validate.
    pub fn with_config(store: S, scheme: C, config: BannerConfig) -> Result<Self, BannerError> {
        config.validate()?;
        let translations = config.translation_table()?;
        Ok(Self::assemble(store, scheme, config, translations))
    }

    fn assemble(store: S, scheme: C, config: BannerConfig, translations: TranslationTable) -> Self {
        let links = config.links.to_vec();
        Self {
            store,
            scheme,
            config,
            translations,
            links,
            state: LifecycleState::Unmounted,
            consent: ConsentState::Unknown,
            lang: None,
            theme_attribute: ThemePreference::System,
            stored_theme: ThemePreference::System,
            os_dark: false,
            output: None,
            attached: None,
            last_control: ControlId::new(0),
            store_changes: None,
            scheme_changes: None,
            stats: RenderStats::default(),
        }
    }

    // === Host-facing operations ===

    /// Attaches the banner.
    ///
    /// Reads consent first. Already accepted: the banner is suppressed and
    /// does nothing else. Otherwise it renders and subscribes to the store and
    /// the OS scheme. Mounting a mounted or removed banner is a no-op.
    pub fn mount(&mut self) {
        if self.state != LifecycleState::Unmounted {
            trace!(state = %self.state, "mount ignored");
            return;
        }

        self.consent = ConsentState::from_stored(self.read(&self.config.consent_key).as_deref());
        if self.consent.is_accepted() {
            self.transition(LifecycleState::MountedSuppressed, "consent already recorded");
            return;
        }

        self.stored_theme = ThemePreference::from_stored(self.read(&self.config.theme_key).as_deref());
        self.os_dark = self.query_os();
        self.transition(LifecycleState::MountedVisible, "no consent recorded");
        self.render_full();
        self.subscribe();
    }

    /// Detaches the banner without recording consent.
    pub fn unmount(&mut self) {
        match self.state {
            LifecycleState::MountedVisible | LifecycleState::MountedSuppressed => {
                self.teardown();
                self.transition(LifecycleState::Unmounted, "host removed the banner");
            }
            LifecycleState::Unmounted | LifecycleState::Removed => {
                trace!(state = %self.state, "unmount ignored");
            }
        }
    }

    /// Sets or removes an attribute (`lang`, `theme`).
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) {
        self.dispatch(BannerEvent::attribute(name, value));
    }

    /// Shorthand for setting the `lang` attribute.
    pub fn set_lang(&mut self, lang: Option<&str>) {
        self.set_attribute(LANG_ATTRIBUTE, lang);
    }

    /// Reports activation of an accept control.
    pub fn activate(&mut self, control: ControlId) {
        self.dispatch(BannerEvent::AcceptActivated(control));
    }

    /// Records consent and removes the banner.
    ///
    /// Only a visible banner can be accepted; on any other state this is a
    /// no-op and nothing is written.
    pub fn accept(&mut self) {
        if self.state != LifecycleState::MountedVisible {
            trace!(state = %self.state, "accept ignored");
            return;
        }
        if let Err(err) = self.store.set(&self.config.consent_key, CONSENT_ACCEPTED) {
            warn!(error = %err, key = %self.config.consent_key, "failed to persist consent");
        }
        self.consent = ConsentState::Accepted;
        self.teardown();
        self.transition(LifecycleState::Removed, "accepted");
    }

    /// Handles every queued notification.
    ///
    /// Store changes are handled before color-scheme changes. Returns the
    /// number of notifications handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.next_notification() {
            self.dispatch(event);
            handled += 1;
        }
        handled
    }

    /// Handles one event.
    pub fn dispatch(&mut self, event: BannerEvent) {
        trace!(?event, state = %self.state, "dispatch");
        match event {
            BannerEvent::AttributeChanged { name, value } => self.on_attribute(&name, value),
            BannerEvent::ColorSchemeChanged(change) => self.on_color_scheme(change),
            BannerEvent::StoreChanged(change) => self.on_store_change(change),
            BannerEvent::AcceptActivated(control) => self.on_activate(control),
        }
    }

    // === Accessors ===

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn consent(&self) -> ConsentState {
        self.consent
    }

    /// The current output; `None` unless visible.
    pub fn output(&self) -> Option<&RenderedOutput> {
        self.output.as_ref()
    }

    /// The control whose activation counts as acceptance, if any.
    pub fn attached_control(&self) -> Option<ControlId> {
        self.attached
    }

    /// The `lang` attribute as last set.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// Theme preference in effect: stored, else the `theme` attribute.
    pub fn theme_preference(&self) -> ThemePreference {
        self.stored_theme.or(self.theme_attribute)
    }

    /// Current resolver output.
    pub fn resolved(&self) -> ResolvedState {
        resolve(self.consent, self.theme_preference(), self.os_dark)
    }

    pub fn effective_theme(&self) -> EffectiveTheme {
        self.resolved().effective_theme
    }

    /// Number of live subscriptions this banner holds (0, 1 or 2).
    pub fn subscription_count(&self) -> usize {
        usize::from(self.store_changes.is_some()) + usize::from(self.scheme_changes.is_some())
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn color_scheme(&self) -> &C {
        &self.scheme
    }

    // === Event handlers ===

    fn on_attribute(&mut self, name: &str, value: Option<String>) {
        match name {
            LANG_ATTRIBUTE => {
                self.lang = value;
                if self.state == LifecycleState::MountedVisible {
                    self.render_full();
                }
            }
            THEME_ATTRIBUTE => {
                self.theme_attribute = ThemePreference::from_stored(value.as_deref());
                if self.state == LifecycleState::MountedVisible {
                    self.refresh_os();
                    self.render_theme();
                }
            }
            other => trace!(attribute = other, "attribute not observed"),
        }
    }

    fn on_color_scheme(&mut self, change: ColorSchemeChange) {
        if self.state != LifecycleState::MountedVisible {
            return;
        }
        self.os_dark = change.prefers_dark;
        if self.theme_preference().is_explicit() {
            trace!("OS scheme change ignored, theme chosen explicitly");
            return;
        }
        self.render_theme();
    }

    fn on_store_change(&mut self, change: StoreChange) {
        if self.state != LifecycleState::MountedVisible {
            return;
        }

        let consent_key = self.config.consent_key.as_str();
        if change.key.as_deref() == Some(consent_key)
            && ConsentState::from_stored(change.new_value.as_deref()).is_accepted()
        {
            self.consent = ConsentState::Accepted;
            self.teardown();
            self.transition(LifecycleState::Removed, "accepted in another context");
            return;
        }

        if change.affects(&self.config.theme_key) {
            self.stored_theme = if change.is_reset() {
                ThemePreference::System
            } else {
                ThemePreference::from_stored(change.new_value.as_deref())
            };
            self.refresh_os();
            self.render_theme();
        }
    }

    fn on_activate(&mut self, control: ControlId) {
        if self.attached == Some(control) {
            self.accept();
        } else {
            debug!(control = control.get(), attached = ?self.attached.map(ControlId::get), "activation of a detached control ignored");
        }
    }

    // === Internals ===

    fn render_full(&mut self) {
        let resolved = self.resolved();
        if !resolved.visible {
            return;
        }

        let control = self.last_control.next();
        self.last_control = control;

        let text = self.translations.lookup(self.lang.as_deref());
        let output = render(&RenderInput {
            theme: resolved.effective_theme,
            palette: self.config.palettes.for_theme(resolved.effective_theme),
            locale: text.locale,
            text: text.entry,
            links: &self.links,
            control,
        });

        trace!(locale = output.locale(), theme = %resolved.effective_theme, control = control.get(), "rendered");
        if let Some(previous) = self.attached.replace(control) {
            trace!(detached = previous.get(), "accept control replaced");
        }
        self.output = Some(output);
        self.stats.full_renders += 1;
    }

    /// Applies the current theme to the existing output. No output yet is a no-op.
    fn render_theme(&mut self) {
        let theme = self.resolved().effective_theme;
        let palette = self.config.palettes.for_theme(theme);
        let Some(output) = self.output.as_mut() else {
            trace!("theme update without output");
            return;
        };
        if output.theme() == theme {
            return;
        }
        output.apply_theme(theme, palette);
        self.stats.theme_updates += 1;
        trace!(%theme, "theme applied");
    }

    fn subscribe(&mut self) {
        if self.store_changes.is_none() {
            self.store_changes = self.store.subscribe();
        }
        if self.scheme_changes.is_none() {
            self.scheme_changes = self.scheme.subscribe();
        }
        debug!(subscriptions = self.subscription_count(), "subscribed");
    }

    fn teardown(&mut self) {
        self.store_changes = None;
        self.scheme_changes = None;
        self.output = None;
        self.attached = None;
    }

    fn next_notification(&self) -> Option<BannerEvent> {
        if let Some(change) = self.store_changes.as_ref().and_then(|s| s.poll()) {
            return Some(BannerEvent::StoreChanged(change));
        }
        self.scheme_changes
            .as_ref()
            .and_then(|s| s.poll())
            .map(BannerEvent::ColorSchemeChanged)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, key, "store read failed, treating as absent");
                None
            }
        }
    }

    fn query_os(&self) -> bool {
        self.scheme.prefers_dark().unwrap_or(false)
    }

    fn refresh_os(&mut self) {
        self.os_dark = self.query_os();
    }

    fn transition(&mut self, to: LifecycleState, reason: &'static str) {
        debug!(from = %self.state, %to, reason, "banner lifecycle");
        self.state = to;
    }
}

impl<S, C> fmt::Debug for Banner<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Banner")
            .field("state", &self.state)
            .field("consent", &self.consent)
            .field("lang", &self.lang)
            .field("theme_attribute", &self.theme_attribute)
            .field("stored_theme", &self.stored_theme)
            .field("os_dark", &self.os_dark)
            .field("attached", &self.attached)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
