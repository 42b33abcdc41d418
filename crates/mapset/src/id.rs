use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::info::{MapInfo, MapStatus};

/// Handle to one registered map version.
///
/// Cheap to clone. Two ids are equal iff they refer to the same [`MapInfo`]
/// record, so a re-registration of an identical file produces a distinct id.
/// Holding an id keeps the record alive but not the map's opened value.
#[derive(Clone, Default)]
pub struct MapId {
	info: Option<Arc<MapInfo>>,
}

impl MapId {
	pub(crate) fn new(info: Arc<MapInfo>) -> Self {
		Self { info: Some(info) }
	}

	/// Returns the null id.
	pub const fn none() -> Self {
		Self { info: None }
	}

	/// Makes this id null.
	pub fn reset(&mut self) {
		self.info = None;
	}

	/// True when the id refers to a record that has not been deregistered.
	pub fn is_alive(&self) -> bool {
		self.info
			.as_ref()
			.is_some_and(|info| info.status() != MapStatus::Deregistered)
	}

	/// Returns the referenced record.
	///
	/// # Panics
	///
	/// Panics on a null id.
	pub fn info(&self) -> &Arc<MapInfo> {
		match &self.info {
			Some(info) => info,
			None => panic!("MapId::info called on a null id"),
		}
	}

	/// Returns the referenced record, or `None` for a null id.
	pub fn get(&self) -> Option<&Arc<MapInfo>> {
		self.info.as_ref()
	}
}

impl PartialEq for MapId {
	fn eq(&self, other: &Self) -> bool {
		match (&self.info, &other.info) {
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			(None, None) => true,
			_ => false,
		}
	}
}

impl Eq for MapId {}

impl Hash for MapId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.info.as_ref().map(Arc::as_ptr).hash(state);
	}
}

impl fmt::Display for MapId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.info {
			Some(info) => write!(f, "{}", info.local_file()),
			None => f.write_str("<none>"),
		}
	}
}

impl fmt::Debug for MapId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "MapId({self})")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backend::MapHeader;
	use crate::file::{LocalMapFile, MapVersion};

	fn record() -> Arc<MapInfo> {
		Arc::new(MapInfo::new(
			LocalMapFile::new("/maps", "Chad", MapVersion(150101)),
			MapHeader::default(),
		))
	}

	#[test]
	fn null_id_is_not_alive() {
		let id = MapId::none();
		assert!(!id.is_alive());
		assert_eq!(id, MapId::default());
		assert_eq!(id.to_string(), "<none>");
	}

	#[test]
	fn equality_is_record_identity() {
		let a = record();
		let b = record();
		assert_eq!(MapId::new(a.clone()), MapId::new(a.clone()));
		assert_ne!(MapId::new(a), MapId::new(b));
	}

	#[test]
	fn deregistered_record_is_not_alive() {
		let info = record();
		let mut id = MapId::new(info.clone());
		assert!(id.is_alive());
		info.set_status(MapStatus::MarkedForRemoval);
		assert!(id.is_alive());
		info.set_status(MapStatus::Deregistered);
		assert!(!id.is_alive());
		id.reset();
		assert!(id.get().is_none());
	}
}
