//! Registry of versioned map packs.
//!
//! A [`MapSet`] knows which versions of each named map pack exist, hands out
//! borrow-counted access to their opened in-memory values and keeps released
//! values in a bounded idle cache so successive borrows avoid reopening files.
//!
//! # Architecture
//!
//! * [`MapSet`]: version table, idle cache and the lock guarding both
//! * [`MapGuard`]: RAII borrow of one map value
//! * [`MapId`] / [`MapInfo`]: shared handle to a version and its metadata
//! * [`MapBackend`]: reads headers, opens values and reclaims removed files
//! * [`MapSetConfig`]: cache size and classification thresholds
//!
//! # Lifecycle
//!
//! Registering a newer version of a map supersedes the current one. Versions
//! that are still borrowed when removed are only marked; they leave the
//! registry, and [`MapBackend::on_removed`] fires, when the last
//! [`MapGuard`] for them drops.
//!
//! The library logs through `tracing` and installs no subscriber.

mod backend;
mod cache;
pub mod config;
mod error;
mod file;
mod id;
mod info;
mod set;

pub use backend::{MapBackend, MapHeader};
pub use config::{DEFAULT_CACHE_SIZE, MapSetConfig};
pub use error::{BackendError, ConfigError, RegisterError};
pub use file::{LocalMapFile, MAP_FILE_EXTENSION, MapVersion};
pub use id::MapId;
pub use info::{MapInfo, MapKind, MapStatus, ScaleThresholds};
pub use set::{MapGuard, MapSet};
