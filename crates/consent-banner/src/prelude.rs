//! Convenient imports for hosts embedding a banner.
//!
//! ```rust
//! use consent_banner::prelude::*;
//!
//! let mut banner = Banner::new(MemoryStore::new(), NoColorScheme);
//! banner.mount();
//! assert_eq!(banner.state(), LifecycleState::MountedVisible);
//! ```

// Lifecycle
pub use crate::banner::{Banner, BannerEvent, LifecycleState};

// Configuration
pub use crate::config::BannerConfig;
pub use crate::error::{BannerError, StoreError};

// Collaborator traits and backends
pub use crate::scheme::{ColorSchemeSource, ManualColorScheme, NoColorScheme, OsColorScheme};
pub use crate::store::{FileStore, KeyValueStore, MemoryStore, SharedStorage};

// Output
pub use crate::preference::EffectiveTheme;
pub use crate::render::{ControlId, RenderedOutput};
