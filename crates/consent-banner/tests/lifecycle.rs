//! End-to-end banner scenarios across contexts, themes and locales.

use consent_banner::{
    Banner, BannerConfig, EffectiveTheme, FileStore, KeyValueStore, LifecycleState,
    ManualColorScheme, MemoryStore, NoColorScheme, SharedStorage, UnavailableStore,
};
use tempfile::TempDir;

// ============================================================================
// Initial load
// ============================================================================

#[test]
fn first_visit_shows_light_english_banner() {
    let store = MemoryStore::new();
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(store, &os);
    banner.mount();

    let output = banner.output().expect("banner is visible");
    assert_eq!(output.theme(), EffectiveTheme::Light);
    assert_eq!(output.message(), "We use cookies to improve your experience.");
    assert_eq!(output.button_label(), "Accept");

    let labels: Vec<_> = output.links().iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, ["Privacy Policy", "Terms and Conditions"]);
}

#[test]
fn returning_visitor_sees_nothing_and_nothing_listens() {
    let storage = SharedStorage::new();
    let store = storage.open_context();
    store.set("cookiesAccepted", "true").unwrap();
    let os = ManualColorScheme::dark();

    let mut banner = Banner::new(store, &os);
    banner.mount();

    assert_eq!(banner.state(), LifecycleState::MountedSuppressed);
    assert!(banner.output().is_none());
    assert_eq!(storage.listener_count(), 0);
    assert_eq!(os.listener_count(), 0);
}

#[test]
fn only_exact_true_counts_as_consent() {
    for stored in ["TRUE", "yes", "1", " true", ""] {
        let store = MemoryStore::new();
        store.set("cookiesAccepted", stored).unwrap();
        let mut banner = Banner::new(store, NoColorScheme);
        banner.mount();
        assert_eq!(banner.state(), LifecycleState::MountedVisible, "stored {stored:?}");
    }
}

#[test]
fn stored_preference_beats_os() {
    let store = MemoryStore::new();
    store.set("theme", "dark").unwrap();
    let os = ManualColorScheme::light();

    let mut banner = Banner::new(store, &os);
    banner.mount();

    assert_eq!(banner.output().unwrap().theme(), EffectiveTheme::Dark);
}

// ============================================================================
// Accept
// ============================================================================

#[test]
fn accept_writes_once_and_is_idempotent() {
    let storage = SharedStorage::new();
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(storage.open_context(), &os);
    banner.mount();

    let control = banner.output().unwrap().accept_control().id();
    banner.activate(control);
    banner.activate(control);
    banner.accept();

    assert_eq!(banner.state(), LifecycleState::Removed);
    assert_eq!(storage.set_count(), 1);
    assert_eq!(
        storage.snapshot().get("cookiesAccepted").map(String::as_str),
        Some("true")
    );
    assert_eq!(storage.listener_count(), 0);
    assert_eq!(os.listener_count(), 0);
}

#[test]
fn next_page_load_after_accept_is_suppressed() {
    let storage = SharedStorage::new();
    let mut first_load = Banner::new(storage.open_context(), NoColorScheme);
    first_load.mount();
    first_load.accept();

    let mut second_load = Banner::new(storage.open_context(), NoColorScheme);
    second_load.mount();

    assert_eq!(second_load.state(), LifecycleState::MountedSuppressed);
}

#[test]
fn activating_a_replaced_control_does_nothing() {
    let store = MemoryStore::new();
    let mut banner = Banner::new(store.clone(), NoColorScheme);
    banner.mount();
    let stale = banner.output().unwrap().accept_control().id();

    banner.set_lang(Some("fr"));
    banner.activate(stale);
    assert_eq!(banner.state(), LifecycleState::MountedVisible);
    assert_eq!(store.get("cookiesAccepted").unwrap(), None);

    let fresh = banner.output().unwrap().accept_control().id();
    banner.activate(fresh);
    assert_eq!(banner.state(), LifecycleState::Removed);
}

#[test]
fn unwritable_store_still_removes_banner() {
    let mut banner = Banner::new(UnavailableStore, NoColorScheme);
    banner.mount();
    assert_eq!(banner.state(), LifecycleState::MountedVisible);

    banner.accept();
    assert_eq!(banner.state(), LifecycleState::Removed);
    assert!(banner.output().is_none());
}

// ============================================================================
// Cross-context convergence
// ============================================================================

#[test]
fn accept_in_one_tab_removes_banner_in_another() {
    let storage = SharedStorage::new();
    let os = ManualColorScheme::light();
    let mut tab_a = Banner::new(storage.open_context(), &os);
    let mut tab_b = Banner::new(storage.open_context(), &os);
    tab_a.mount();
    tab_b.mount();
    assert_eq!(storage.listener_count(), 2);

    tab_a.accept();
    assert_eq!(tab_b.pump(), 1);

    assert_eq!(tab_b.state(), LifecycleState::Removed);
    assert!(tab_b.output().is_none());
    assert_eq!(storage.set_count(), 1, "the other tab must not write again");
    assert_eq!(storage.listener_count(), 0);
    assert_eq!(os.listener_count(), 0);
}

#[test]
fn writer_is_not_notified_of_its_own_write() {
    let storage = SharedStorage::new();
    let here = storage.open_context();
    let mut banner = Banner::new(here.clone(), NoColorScheme);
    banner.mount();

    here.set("theme", "dark").unwrap();
    assert_eq!(banner.pump(), 0);
}

#[test]
fn theme_round_trip_through_another_tab() {
    let storage = SharedStorage::new();
    let settings_tab = storage.open_context();
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(storage.open_context(), &os);
    banner.mount();
    let control = banner.attached_control();

    settings_tab.set("theme", "dark").unwrap();
    banner.pump();
    assert_eq!(banner.output().unwrap().theme(), EffectiveTheme::Dark);

    // Explicit preference ignores the OS.
    os.set_prefers_dark(false);
    os.set_prefers_dark(true);
    os.set_prefers_dark(false);
    banner.pump();
    assert_eq!(banner.output().unwrap().theme(), EffectiveTheme::Dark);

    settings_tab.remove("theme");
    banner.pump();
    assert_eq!(banner.output().unwrap().theme(), EffectiveTheme::Light);

    os.set_prefers_dark(true);
    banner.pump();
    assert_eq!(banner.output().unwrap().theme(), EffectiveTheme::Dark);

    // Theme changes never replace the content or the control.
    assert_eq!(banner.attached_control(), control);
    assert_eq!(banner.stats().full_renders, 1);
}

#[test]
fn clearing_storage_elsewhere_keeps_banner_and_resets_theme() {
    let storage = SharedStorage::new();
    let other = storage.open_context();
    other.set("theme", "dark").unwrap();
    let os = ManualColorScheme::light();

    let mut banner = Banner::new(storage.open_context(), &os);
    banner.mount();
    assert_eq!(banner.effective_theme(), EffectiveTheme::Dark);

    other.clear();
    banner.pump();

    assert_eq!(banner.state(), LifecycleState::MountedVisible);
    assert_eq!(banner.effective_theme(), EffectiveTheme::Light);
}

// ============================================================================
// Locale
// ============================================================================

#[test]
fn lang_change_after_mount_rerenders_in_place() {
    let storage = SharedStorage::new();
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(storage.open_context(), &os);
    banner.mount();

    banner.set_lang(Some("fr"));

    let output = banner.output().unwrap();
    assert_eq!(output.locale(), "fr");
    assert_eq!(output.button_label(), "Accepter");
    assert_eq!(storage.listener_count(), 1);
    assert_eq!(os.listener_count(), 1);
    assert_eq!(banner.stats().full_renders, 2);
}

#[test]
fn unsupported_locale_falls_back_to_english() {
    let mut banner = Banner::new(MemoryStore::new(), NoColorScheme);
    banner.set_lang(Some("de"));
    banner.mount();

    let output = banner.output().unwrap();
    assert_eq!(output.locale(), "en");
    assert_eq!(output.message(), "We use cookies to improve your experience.");
}

#[test]
fn regional_locale_uses_primary_language() {
    let mut banner = Banner::new(MemoryStore::new(), NoColorScheme);
    banner.set_lang(Some("es-MX"));
    banner.mount();

    assert_eq!(banner.output().unwrap().button_label(), "Aceptar");
}

#[test]
fn configured_translation_is_used() {
    let config = BannerConfig::from_yaml(
        "translations:\n  de:\n    message: Wir verwenden Cookies.\n    button: Akzeptieren\n",
    )
    .unwrap();
    let mut banner = Banner::with_config(MemoryStore::new(), NoColorScheme, config).unwrap();
    banner.set_lang(Some("de"));
    banner.mount();

    assert_eq!(banner.output().unwrap().button_label(), "Akzeptieren");
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn unmount_and_remount_resubscribes_once() {
    let storage = SharedStorage::new();
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(storage.open_context(), &os);

    banner.mount();
    banner.unmount();
    assert_eq!(storage.listener_count(), 0);
    assert_eq!(os.listener_count(), 0);

    banner.mount();
    banner.mount();
    assert_eq!(storage.listener_count(), 1);
    assert_eq!(os.listener_count(), 1);
    assert!(storage.snapshot().is_empty());
}

#[test]
fn file_store_persists_consent_between_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");

    let mut first = Banner::new(FileStore::new(&path), NoColorScheme);
    first.mount();
    assert_eq!(first.state(), LifecycleState::MountedVisible);
    first.accept();

    let mut second = Banner::new(FileStore::new(&path), NoColorScheme);
    second.mount();
    assert_eq!(second.state(), LifecycleState::MountedSuppressed);
}

#[test]
fn markup_reflects_theme_update() {
    let os = ManualColorScheme::light();
    let mut banner = Banner::new(MemoryStore::new(), &os);
    banner.mount();
    let light = banner.output().unwrap().to_markup().unwrap();

    os.set_prefers_dark(true);
    banner.pump();
    let dark = banner.output().unwrap().to_markup().unwrap();

    assert!(light.contains(r#"data-theme="light""#));
    assert!(dark.contains(r#"data-theme="dark""#));
    assert_eq!(dark.matches("<button").count(), 1);
}
