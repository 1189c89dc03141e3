//! Renders the consent banner the way a page load would, from the command line.
//!
//! A `--store` file plays the part of the browser's persistent storage, so
//! consecutive runs behave like consecutive page loads:
//!
//! ```text
//! $ banner-preview --store prefs.json --lang fr       # banner shown, in French
//! $ banner-preview --store prefs.json --accept        # banner shown, then accepted
//! $ banner-preview --store prefs.json                 # nothing: consent recorded
//! ```

mod logging;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use consent_banner::{
    Banner, BannerConfig, ColorSchemeSource, FileStore, KeyValueStore, ManualColorScheme,
    MemoryStore, NoColorScheme, OsColorScheme,
};
use serde_json::json;
use tracing::{debug, info};

use crate::logging::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "banner-preview")]
#[command(version)]
#[command(about = "Preview the cookie consent banner for a simulated page load")]
struct Cli {
    /// JSON file standing in for persistent storage; in-memory when omitted
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// YAML banner configuration
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Locale tag given to the banner (e.g. "fr", "es-MX")
    #[arg(long, value_name = "TAG")]
    lang: Option<String>,

    /// Store an explicit theme preference before loading
    #[arg(long, value_enum)]
    theme: Option<ThemeArg>,

    /// OS color scheme to simulate
    #[arg(long, value_enum, default_value_t = OsArg::Auto)]
    os: OsArg,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Activate the accept button after rendering
    #[arg(long)]
    accept: bool,

    /// Clear the store before loading
    #[arg(long)]
    reset: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Errors only
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    /// Follow the OS color scheme
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OsArg {
    /// Ask the operating system
    Auto,
    Light,
    Dark,
    /// No OS signal at all
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(Verbosity::from_flags(cli.verbose, cli.quiet));

    let report = run(&cli)?;
    if !report.is_empty() {
        println!("{report}");
    }
    Ok(())
}

/// Simulates one page load and returns what should be printed.
fn run(cli: &Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => BannerConfig::from_file(path)
            .with_context(|| format!("loading banner configuration from {}", path.display()))?,
        None => BannerConfig::default(),
    };

    let store = open_store(cli.store.as_ref(), cli.reset)?;
    if let Some(theme) = cli.theme {
        store_theme(store.as_ref(), &config.theme_key, theme)?;
    }
    let scheme = color_scheme(cli.os);

    let mut banner = Banner::with_config(store.as_ref(), scheme.as_ref(), config)
        .context("invalid banner configuration")?;
    banner.set_lang(cli.lang.as_deref());
    banner.mount();
    debug!(state = %banner.state(), "page loaded");

    let rendered = banner.output().cloned();
    if cli.accept {
        if let Some(control) = banner.attached_control() {
            banner.activate(control);
            info!("consent accepted");
        }
    }

    match cli.format {
        Format::Json => {
            let report = json!({
                "state": banner.state().to_string(),
                "consent": banner.consent(),
                "effective_theme": banner.effective_theme(),
                "output": rendered,
            });
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Format::Html => match rendered {
            Some(output) => Ok(output.to_markup()?),
            None => Ok(String::new()),
        },
    }
}

fn open_store(path: Option<&PathBuf>, reset: bool) -> Result<Box<dyn KeyValueStore>> {
    match path {
        Some(path) => {
            let store = FileStore::new(path);
            if reset {
                store
                    .clear()
                    .with_context(|| format!("clearing {}", path.display()))?;
            }
            Ok(Box::new(store))
        }
        None => Ok(Box::new(MemoryStore::new())),
    }
}

fn store_theme(store: &dyn KeyValueStore, key: &str, theme: ThemeArg) -> Result<()> {
    let value = match theme {
        ThemeArg::Light => "light",
        ThemeArg::Dark => "dark",
        ThemeArg::System => "system",
    };
    store
        .set(key, value)
        .with_context(|| format!("storing theme preference under '{key}'"))
}

fn color_scheme(os: OsArg) -> Box<dyn ColorSchemeSource> {
    match os {
        OsArg::Auto => Box::new(OsColorScheme::new()),
        OsArg::Light => Box::new(ManualColorScheme::light()),
        OsArg::Dark => Box::new(ManualColorScheme::dark()),
        OsArg::None => Box::new(NoColorScheme),
    }
}
