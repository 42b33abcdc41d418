//! Collaborators that read, open and reclaim map files.
//!
//! The registry never touches map bytes itself. Everything file-specific goes
//! through a [`MapBackend`], which is called with the registry lock held and
//! therefore must not call back into the [`MapSet`](crate::MapSet).

use crate::error::BackendError;
use crate::file::LocalMapFile;

/// Header fields read from a map file at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapHeader {
	/// Lowest scale stored in the map.
	pub min_scale: u8,
	/// Highest scale stored in the map.
	pub max_scale: u8,
	/// Version of the on-disk format.
	pub format_version: u32,
}

/// File-specific operations the registry delegates.
pub trait MapBackend: Send + Sync {
	/// In-memory representation of an opened map.
	type Value: Send + Sync;

	/// Reads the header of `file`.
	///
	/// A failure rejects the registration of `file`.
	fn read_header(&self, file: &LocalMapFile) -> Result<MapHeader, BackendError>;

	/// Opens `file` into its in-memory value.
	///
	/// Only called for files whose header was read successfully, and is
	/// expected to succeed for them.
	fn open(&self, file: &LocalMapFile) -> Result<Self::Value, BackendError>;

	/// Called exactly once when a map version is removed from the registry,
	/// so its backing storage may be reclaimed.
	fn on_removed(&self, _file: &LocalMapFile) {}
}
