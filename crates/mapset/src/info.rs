//! Per-version metadata records.
//!
//! # Invariants
//!
//! - `status` and `borrow_count` are only written while the owning
//!   [`MapSet`](crate::MapSet) lock is held. They are atomics so that
//!   [`MapId::is_alive`](crate::MapId::is_alive) can be answered without it.
//! - A record leaves its name's version list only after reaching
//!   [`MapStatus::Deregistered`].

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::backend::MapHeader;
use crate::file::{LocalMapFile, MapVersion};

/// Lifecycle state of one registered map version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MapStatus {
	/// Eligible for new borrows and for the idle cache.
	Registered = 0,
	/// Removal requested while borrowed; completes on the last release.
	MarkedForRemoval = 1,
	/// Removed from the registry. Terminal.
	Deregistered = 2,
}

impl MapStatus {
	fn from_u8(raw: u8) -> Self {
		match raw {
			0 => Self::Registered,
			1 => Self::MarkedForRemoval,
			_ => Self::Deregistered,
		}
	}
}

/// Display category derived from a map's scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
	Country,
	World,
	Coasts,
}

/// Scale thresholds used to classify maps into [`MapKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleThresholds {
	/// Highest scale stored in the world map.
	pub upper_world_scale: u8,
	/// Highest scale of any map.
	pub upper_scale: u8,
}

impl Default for ScaleThresholds {
	fn default() -> Self {
		Self {
			upper_world_scale: 9,
			upper_scale: 17,
		}
	}
}

/// Metadata for one known version of one map.
///
/// Shared via `Arc` between the registry's version table, [`MapId`](crate::MapId)s,
/// guards and idle cache entries.
pub struct MapInfo {
	file: LocalMapFile,
	min_scale: u8,
	max_scale: u8,
	format_version: u32,
	status: AtomicU8,
	borrow_count: AtomicUsize,
}

impl MapInfo {
	pub(crate) fn new(file: LocalMapFile, header: MapHeader) -> Self {
		Self {
			file,
			min_scale: header.min_scale,
			max_scale: header.max_scale,
			format_version: header.format_version,
			status: AtomicU8::new(MapStatus::Registered as u8),
			borrow_count: AtomicUsize::new(0),
		}
	}

	pub fn name(&self) -> &str {
		self.file.name()
	}

	pub fn version(&self) -> MapVersion {
		self.file.version()
	}

	pub fn local_file(&self) -> &LocalMapFile {
		&self.file
	}

	/// Lowest scale stored in the map.
	pub fn min_scale(&self) -> u8 {
		self.min_scale
	}

	/// Highest scale stored in the map.
	pub fn max_scale(&self) -> u8 {
		self.max_scale
	}

	/// Header format version reported by the backend.
	pub fn format_version(&self) -> u32 {
		self.format_version
	}

	pub fn status(&self) -> MapStatus {
		MapStatus::from_u8(self.status.load(Ordering::Acquire))
	}

	/// Number of outstanding borrows holding a value of this map.
	pub fn borrow_count(&self) -> usize {
		self.borrow_count.load(Ordering::Acquire)
	}

	pub fn is_registered(&self) -> bool {
		self.status() == MapStatus::Registered
	}

	/// Whether the map accepts new borrows and may keep values in the idle cache.
	pub fn is_up_to_date(&self) -> bool {
		self.is_registered()
	}

	/// Classifies the map against `scales`.
	pub fn kind(&self, scales: &ScaleThresholds) -> MapKind {
		if self.min_scale > 0 {
			return MapKind::Country;
		}
		if self.max_scale == scales.upper_world_scale {
			return MapKind::World;
		}
		debug_assert_eq!(self.max_scale, scales.upper_scale, "unexpected max scale for {}", self.file);
		MapKind::Coasts
	}

	pub(crate) fn set_status(&self, status: MapStatus) {
		self.status.store(status as u8, Ordering::Release);
	}

	pub(crate) fn increment_borrows(&self) -> usize {
		self.borrow_count.fetch_add(1, Ordering::AcqRel) + 1
	}

	/// Decrements the borrow count and returns the new value.
	///
	/// Panics on underflow.
	pub(crate) fn decrement_borrows(&self) -> usize {
		let current = self.borrow_count.load(Ordering::Acquire);
		assert!(current > 0, "borrow count underflow for {}", self.file);
		self.borrow_count.store(current - 1, Ordering::Release);
		current - 1
	}
}

impl fmt::Debug for MapInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MapInfo")
			.field("name", &self.name())
			.field("version", &self.version())
			.field("min_scale", &self.min_scale)
			.field("max_scale", &self.max_scale)
			.field("status", &self.status())
			.field("borrow_count", &self.borrow_count())
			.finish()
	}
}
