use std::fmt;
use std::sync::Arc;

use super::MapSet;
use crate::id::MapId;
use crate::info::MapInfo;

/// One active borrow of a map's opened value.
///
/// Dropping the guard releases the borrow: the value returns to the idle
/// cache, or the map's deferred removal completes if this was the last
/// borrow. A guard without a value is inert and releases nothing; it is
/// returned when the map is unknown or no longer accepts borrows.
#[must_use = "dropping a MapGuard immediately releases the borrow"]
pub struct MapGuard<'a, V>
where
	V: Send + Sync + 'static,
{
	set: Option<&'a MapSet<V>>,
	id: MapId,
	value: Option<Arc<V>>,
}

impl<'a, V> MapGuard<'a, V>
where
	V: Send + Sync + 'static,
{
	/// Wraps a value already acquired under the set's lock.
	pub(super) fn new(set: &'a MapSet<V>, id: MapId, value: Option<Arc<V>>) -> Self {
		Self {
			set: Some(set),
			id,
			value,
		}
	}

	/// Returns an inert guard.
	pub fn inert() -> Self {
		Self {
			set: None,
			id: MapId::none(),
			value: None,
		}
	}

	/// True if the guard holds a value.
	pub fn is_locked(&self) -> bool {
		self.value.is_some()
	}

	pub fn id(&self) -> &MapId {
		&self.id
	}

	/// Metadata of the borrowed map version.
	///
	/// # Panics
	///
	/// Panics if the guard is inert.
	pub fn info(&self) -> &Arc<MapInfo> {
		assert!(self.is_locked(), "MapGuard is not active");
		self.id.info()
	}

	/// The borrowed value; valid for as long as the guard lives.
	pub fn value(&self) -> Option<&V> {
		self.value.as_deref()
	}
}

impl<V> Default for MapGuard<'_, V>
where
	V: Send + Sync + 'static,
{
	fn default() -> Self {
		Self::inert()
	}
}

impl<V> Drop for MapGuard<'_, V>
where
	V: Send + Sync + 'static,
{
	fn drop(&mut self) {
		if let (Some(set), Some(value)) = (self.set, self.value.take()) {
			set.unlock_value(&self.id, value);
		}
	}
}

impl<V> fmt::Debug for MapGuard<'_, V>
where
	V: Send + Sync + 'static,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MapGuard")
			.field("id", &self.id)
			.field("locked", &self.is_locked())
			.finish()
	}
}
