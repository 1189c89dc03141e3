//! OS-level color scheme signal.
//!
//! The banner follows the operating system's light/dark preference whenever
//! the visitor has not chosen a theme explicitly. [`ColorSchemeSource`] is the
//! seam: it answers "does the OS prefer dark?" and, optionally, notifies when
//! that answer changes.
//!
//! `None` from [`prefers_dark`](ColorSchemeSource::prefers_dark) means the
//! platform cannot tell; the banner treats it as light.
//!
//! ## Sources
//!
//! - [`OsColorScheme`]: queries the OS through the `dark-light` crate. The OS
//!   does not push changes, so the host calls [`OsColorScheme::refresh`]
//!   from its event loop; a notification is published only when the answer
//!   flips.
//! - [`ManualColorScheme`]: driven by the embedder (or a test).
//! - [`NoColorScheme`]: a platform without color-scheme support.
//!
//! Override OS detection for testing with [`OsColorScheme::with_detector`]:
//!
//! ```rust
//! use consent_banner::scheme::{ColorSchemeSource, OsColorScheme};
//!
//! let scheme = OsColorScheme::with_detector(|| Some(true));
//! assert_eq!(scheme.prefers_dark(), Some(true));
//! ```

use std::cell::Cell;
use std::rc::Rc;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use tracing::debug;

use crate::notify::{Notifier, Subscription};

/// The OS color preference changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSchemeChange {
    pub prefers_dark: bool,
}

/// A "prefers dark" query with optional change notifications.
pub trait ColorSchemeSource {
    /// Current OS preference, `None` when unsupported.
    fn prefers_dark(&self) -> Option<bool>;

    /// Subscribes to preference changes. `None` when changes cannot be observed.
    fn subscribe(&self) -> Option<Subscription<ColorSchemeChange>> {
        None
    }
}

impl<C: ColorSchemeSource + ?Sized> ColorSchemeSource for &C {
    fn prefers_dark(&self) -> Option<bool> {
        (**self).prefers_dark()
    }

    fn subscribe(&self) -> Option<Subscription<ColorSchemeChange>> {
        (**self).subscribe()
    }
}

impl<C: ColorSchemeSource + ?Sized> ColorSchemeSource for Rc<C> {
    fn prefers_dark(&self) -> Option<bool> {
        (**self).prefers_dark()
    }

    fn subscribe(&self) -> Option<Subscription<ColorSchemeChange>> {
        (**self).subscribe()
    }
}

type SchemeDetector = fn() -> Option<bool>;

/// The operating system's color scheme, via `dark-light`.
#[derive(Debug)]
pub struct OsColorScheme {
    detector: SchemeDetector,
    last: Cell<Option<bool>>,
    changes: Notifier<ColorSchemeChange>,
}

impl OsColorScheme {
    /// Queries the OS once to seed the change baseline.
    pub fn new() -> Self {
        Self::with_detector(os_scheme_detector)
    }

    /// Uses `detector` instead of querying the OS.
    pub fn with_detector(detector: SchemeDetector) -> Self {
        Self {
            detector,
            last: Cell::new(detector()),
            changes: Notifier::new(),
        }
    }

    /// Re-queries the detector, publishing a change if the answer flipped.
    ///
    /// Returns `true` when a change was published.
    pub fn refresh(&self) -> bool {
        let current = (self.detector)();
        let previous = self.last.replace(current);
        if current == previous {
            return false;
        }
        debug!(?previous, ?current, "OS color scheme changed");
        self.changes.publish(ColorSchemeChange {
            prefers_dark: current.unwrap_or(false),
        });
        true
    }

    /// Number of live change subscriptions.
    pub fn listener_count(&self) -> usize {
        self.changes.subscriber_count()
    }
}

impl Default for OsColorScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorSchemeSource for OsColorScheme {
    /// Asks the detector now. Only [`refresh`](OsColorScheme::refresh) moves
    /// the baseline that change notifications are computed against.
    fn prefers_dark(&self) -> Option<bool> {
        (self.detector)()
    }

    fn subscribe(&self) -> Option<Subscription<ColorSchemeChange>> {
        Some(self.changes.subscribe())
    }
}

fn os_scheme_detector() -> Option<bool> {
    match detect_os_theme() {
        Ok(OsThemeMode::Dark) => Some(true),
        Ok(OsThemeMode::Light) => Some(false),
        Ok(_) => None,
        Err(err) => {
            debug!(error = ?err, "OS color scheme detection failed");
            None
        }
    }
}

/// A color scheme set by hand.
///
/// Mirrors an OS preference the embedder already tracks, and stands in for
/// the OS in tests.
#[derive(Debug)]
pub struct ManualColorScheme {
    dark: Cell<Option<bool>>,
    changes: Notifier<ColorSchemeChange>,
}

impl ManualColorScheme {
    /// Starts with the given preference.
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            dark: Cell::new(Some(prefers_dark)),
            changes: Notifier::new(),
        }
    }

    /// Starts in light mode.
    pub fn light() -> Self {
        Self::new(false)
    }

    /// Starts in dark mode.
    pub fn dark() -> Self {
        Self::new(true)
    }

    /// Changes the preference, notifying subscribers if it differs.
    pub fn set_prefers_dark(&self, prefers_dark: bool) {
        let previous = self.dark.replace(Some(prefers_dark));
        if previous != Some(prefers_dark) {
            self.changes.publish(ColorSchemeChange { prefers_dark });
        }
    }

    /// Number of live change subscriptions.
    pub fn listener_count(&self) -> usize {
        self.changes.subscriber_count()
    }
}

impl ColorSchemeSource for ManualColorScheme {
    fn prefers_dark(&self) -> Option<bool> {
        self.dark.get()
    }

    fn subscribe(&self) -> Option<Subscription<ColorSchemeChange>> {
        Some(self.changes.subscribe())
    }
}

/// A platform with no color-scheme support.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoColorScheme;

impl ColorSchemeSource for NoColorScheme {
    fn prefers_dark(&self) -> Option<bool> {
        None
    }
}
