//! Property-based tests for state resolution and locale lookup.

use consent_banner::{
    resolve, Banner, ConsentState, EffectiveTheme, LifecycleState, ManualColorScheme,
    MemoryStore, ThemePreference, TranslationTable,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn consent_strategy() -> impl Strategy<Value = ConsentState> {
    prop_oneof![Just(ConsentState::Unknown), Just(ConsentState::Accepted)]
}

fn preference_strategy() -> impl Strategy<Value = ThemePreference> {
    prop_oneof![
        Just(ThemePreference::Light),
        Just(ThemePreference::Dark),
        Just(ThemePreference::System),
    ]
}

/// Raw values as they might sit in storage, well-formed or not.
fn stored_value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("light".to_string())),
        Just(Some("dark".to_string())),
        Just(Some("true".to_string())),
        "[ -~]{0,12}".prop_map(Some),
    ]
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Resolution depends on nothing but its inputs.
    #[test]
    fn resolve_is_deterministic(
        consent in consent_strategy(),
        pref in preference_strategy(),
        os_dark in any::<bool>(),
    ) {
        prop_assert_eq!(resolve(consent, pref, os_dark), resolve(consent, pref, os_dark));
    }

    /// Visibility is exactly "consent not given".
    #[test]
    fn visibility_tracks_consent_only(
        consent in consent_strategy(),
        pref in preference_strategy(),
        os_dark in any::<bool>(),
    ) {
        let state = resolve(consent, pref, os_dark);
        prop_assert_eq!(state.visible, !consent.is_accepted());
    }

    /// An explicit preference always wins over the OS signal.
    #[test]
    fn explicit_preference_ignores_os(os_dark in any::<bool>()) {
        let light = resolve(ConsentState::Unknown, ThemePreference::Light, os_dark);
        let dark = resolve(ConsentState::Unknown, ThemePreference::Dark, os_dark);
        prop_assert_eq!(light.effective_theme, EffectiveTheme::Light);
        prop_assert_eq!(dark.effective_theme, EffectiveTheme::Dark);
    }

    /// Any stored theme value parses without panicking, and anything
    /// unrecognized behaves as "follow the system".
    #[test]
    fn stored_theme_never_fails(value in stored_value_strategy(), os_dark in any::<bool>()) {
        let pref = ThemePreference::from_stored(value.as_deref());
        let state = resolve(ConsentState::Unknown, pref, os_dark);
        if !pref.is_explicit() {
            let expected = if os_dark { EffectiveTheme::Dark } else { EffectiveTheme::Light };
            prop_assert_eq!(state.effective_theme, expected);
        }
    }

    /// Lookup always produces text, and the locale it reports is one the
    /// table actually holds.
    #[test]
    fn lookup_always_resolves(requested in proptest::option::of("[a-zA-Z_-]{0,10}")) {
        let table = TranslationTable::builtin();
        let text = table.lookup(requested.as_deref());
        prop_assert!(table.contains(text.locale));
        prop_assert!(!text.entry.message.is_empty());
        prop_assert!(!text.entry.button.is_empty());
    }

    /// Re-rendering with unchanged inputs is idempotent: the output differs
    /// only in its accept control.
    #[test]
    fn rerender_is_idempotent(
        lang in proptest::option::of(prop_oneof![Just("en"), Just("fr"), Just("es"), Just("de")]),
        os_dark in any::<bool>(),
    ) {
        let os = ManualColorScheme::new(os_dark);
        let mut banner = Banner::new(MemoryStore::new(), &os);
        banner.set_lang(lang);
        banner.mount();
        let before = banner.output().cloned().unwrap();

        banner.set_lang(lang);
        let after = banner.output().cloned().unwrap();

        prop_assert_eq!(banner.state(), LifecycleState::MountedVisible);
        prop_assert_eq!(before.theme(), after.theme());
        prop_assert_eq!(before.locale(), after.locale());
        prop_assert_eq!(before.message(), after.message());
        prop_assert_eq!(before.links(), after.links());
        prop_assert_ne!(before.accept_control().id(), after.accept_control().id());
    }
}
