//! The map registry.
//!
//! Tracks every known version of every map, hands out borrow-counted access
//! to opened map values and keeps recently released values in an idle cache.
//!
//! # Concurrency
//!
//! All mutable state lives in one [`State`] behind a single `parking_lot`
//! mutex. Public [`MapSet`] methods take the lock exactly once and delegate to
//! `State` methods, which assume the lock is held and never take it again.
//! Backend callbacks run under the lock.
//!
//! # Invariants
//!
//! - A version with outstanding borrows is never removed; removal is deferred
//!   via [`MapStatus::MarkedForRemoval`] until the last guard drops.
//! - Only [`MapStatus::Registered`] versions receive new borrows or idle cache
//!   slots.
//! - The idle cache never exceeds its capacity.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::MapBackend;
use crate::cache::IdleCache;
use crate::config::MapSetConfig;
use crate::error::RegisterError;
use crate::file::LocalMapFile;
use crate::id::MapId;
use crate::info::{MapInfo, MapKind, MapStatus};

mod guard;

pub use guard::MapGuard;

type DynBackend<V> = dyn MapBackend<Value = V>;

/// Registry state guarded by the [`MapSet`] lock.
struct State<V> {
	/// Known versions per map name, oldest first. The last entry is current.
	maps: HashMap<String, Vec<Arc<MapInfo>>>,
	cache: IdleCache<V>,
}

impl<V> State<V>
where
	V: Send + Sync + 'static,
{
	fn new(cache_size: usize) -> Self {
		Self {
			maps: HashMap::new(),
			cache: IdleCache::new(cache_size),
		}
	}

	/// Returns the id of the latest version of `name`, or the null id.
	fn current_id(&self, name: &str) -> MapId {
		debug_assert!(!name.is_empty(), "map name must not be empty");
		self.maps
			.get(name)
			.and_then(|versions| versions.last())
			.map(|info| MapId::new(Arc::clone(info)))
			.unwrap_or_default()
	}

	/// Appends a freshly read version to the table.
	fn insert(&mut self, info: MapInfo) -> MapId {
		let info = Arc::new(info);
		debug!(map = %info.local_file(), min_scale = info.min_scale(), max_scale = info.max_scale(), "Registered map");
		self.maps
			.entry(info.name().to_owned())
			.or_default()
			.push(Arc::clone(&info));
		MapId::new(info)
	}

	/// Removes `id` now if unborrowed, otherwise marks it for removal.
	///
	/// Returns true when the removal completed.
	fn deregister_id(&mut self, backend: &DynBackend<V>, id: &MapId) -> bool {
		if !id.is_alive() {
			return false;
		}
		let info = id.info();

		if info.borrow_count() > 0 {
			info.set_status(MapStatus::MarkedForRemoval);
			info!(map = %id, borrows = info.borrow_count(), "Deferring map removal until released");
			return false;
		}

		info.set_status(MapStatus::Deregistered);
		if let Some(versions) = self.maps.get_mut(info.name()) {
			versions.retain(|version| !Arc::ptr_eq(version, info));
			if versions.is_empty() {
				self.maps.remove(info.name());
			}
		}
		info!(map = %id, "Removed map");
		backend.on_removed(info.local_file());
		true
	}

	/// Removes the current version of `name` and drops its idle values.
	fn deregister_name(&mut self, backend: &DynBackend<V>, name: &str) -> bool {
		let id = self.current_id(name);
		if !id.is_alive() {
			return false;
		}
		let removed = self.deregister_id(backend, &id);
		self.purge_cache(&id);
		removed
	}

	fn deregister_all(&mut self, backend: &DynBackend<V>) {
		// Removal edits the version lists, so walk a snapshot.
		let versions: Vec<Arc<MapInfo>> = self.maps.values().flatten().cloned().collect();
		for info in versions {
			self.deregister_id(backend, &MapId::new(info));
		}
		self.clear_cache();
	}

	/// Starts a borrow of `id`'s value.
	///
	/// Returns `None`, without counting a borrow, when the map no longer
	/// accepts borrows.
	///
	/// # Panics
	///
	/// Panics if `id` is not alive.
	fn lock_value(&mut self, backend: &DynBackend<V>, id: &MapId) -> Option<Arc<V>> {
		assert!(id.is_alive(), "cannot lock dead map id {id}");
		let info = id.info();
		if !info.is_up_to_date() {
			return None;
		}

		info.increment_borrows();

		if let Some(value) = self.cache.take(id) {
			debug!(map = %id, "Reusing idle map value");
			return Some(value);
		}

		match backend.open(info.local_file()) {
			Ok(value) => {
				debug!(map = %id, "Opened map value");
				Some(Arc::new(value))
			}
			Err(err) => {
				info.decrement_borrows();
				error!(map = %id, error = %err, "Failed to open registered map");
				if cfg!(debug_assertions) {
					panic!("failed to open registered map {id}: {err}");
				}
				None
			}
		}
	}

	/// Ends a borrow of `id`, completing a deferred removal or parking the
	/// value in the idle cache.
	fn unlock_value(&mut self, backend: &DynBackend<V>, id: &MapId, value: Arc<V>) {
		debug_assert!(id.is_alive(), "unlocking dead map id {id}");
		if !id.is_alive() {
			return;
		}
		let info = id.info();

		let remaining = info.decrement_borrows();
		if remaining == 0 && info.status() == MapStatus::MarkedForRemoval {
			assert!(
				self.deregister_id(backend, id),
				"deferred removal of {id} did not complete"
			);
		}

		if !info.is_up_to_date() {
			return;
		}
		if let Some(evicted) = self.cache.push(id.clone(), value) {
			debug!(map = %evicted, capacity = self.cache.capacity(), "Evicted idle map value");
		}
	}

	fn purge_cache(&mut self, id: &MapId) {
		let purged = self.cache.purge(id);
		if purged > 0 {
			debug!(map = %id, purged, "Dropped idle map values");
		}
	}

	fn clear_cache(&mut self) {
		if !self.cache.is_empty() {
			debug!(count = self.cache.len(), "Clearing idle map cache");
		}
		self.cache.clear();
	}
}

/// Thread-safe registry of versioned map packs.
///
/// Maps are registered from [`LocalMapFile`]s and borrowed through
/// [`MapGuard`]s. A borrowed map's value stays valid for the lifetime of the
/// guard even if the map is deregistered or superseded meanwhile.
pub struct MapSet<V>
where
	V: Send + Sync + 'static,
{
	backend: Box<DynBackend<V>>,
	config: MapSetConfig,
	state: Mutex<State<V>>,
}

impl<V> MapSet<V>
where
	V: Send + Sync + 'static,
{
	/// Creates an empty registry backed by `backend`.
	pub fn new<B>(backend: B, config: MapSetConfig) -> Self
	where
		B: MapBackend<Value = V> + 'static,
	{
		let state = State::new(config.cache_size);
		Self {
			backend: Box::new(backend),
			config,
			state: Mutex::new(state),
		}
	}

	/// Creates an empty registry that keeps up to `cache_size` idle values.
	pub fn with_cache_size<B>(backend: B, cache_size: usize) -> Self
	where
		B: MapBackend<Value = V> + 'static,
	{
		Self::new(
			backend,
			MapSetConfig {
				cache_size,
				..MapSetConfig::default()
			},
		)
	}

	pub fn config(&self) -> &MapSetConfig {
		&self.config
	}

	/// Classifies `info` with the configured scale thresholds.
	pub fn kind_of(&self, info: &MapInfo) -> MapKind {
		info.kind(&self.config.scales)
	}

	/// Registers `file`, superseding an older version of the same map.
	///
	/// On success returns a borrow of the registered version and whether a new
	/// version was added (`false` when this exact version was already known).
	/// Re-registering a known version cancels a pending removal of it.
	///
	/// # Errors
	///
	/// - [`RegisterError::InvalidMap`] if the backend rejects the header.
	/// - [`RegisterError::StaleVersion`] if a newer version is registered.
	///
	/// Neither error changes the registry.
	pub fn register(&self, file: LocalMapFile) -> Result<(MapGuard<'_, V>, bool), RegisterError> {
		let mut state = self.state.lock();
		let current = state.current_id(file.name());

		if current.is_alive() {
			let existing = current.info();
			match existing.version().cmp(&file.version()) {
				Ordering::Equal => {
					warn!(map = %file, "Map is already registered");
					existing.set_status(MapStatus::Registered);
					let value = state.lock_value(self.backend.as_ref(), &current);
					return Ok((MapGuard::new(self, current, value), false));
				}
				Ordering::Greater => {
					warn!(map = %file, current = %existing.version(), "Refusing to register stale map");
					return Err(RegisterError::StaleVersion {
						name: file.name().to_owned(),
						current: existing.version(),
						candidate: file.version(),
					});
				}
				Ordering::Less => {}
			}
		}

		let header = match self.backend.read_header(&file) {
			Ok(header) => header,
			Err(source) => {
				error!(map = %file, error = %source, "Failed to read map header");
				return Err(RegisterError::InvalidMap {
					name: file.name().to_owned(),
					source,
				});
			}
		};

		if current.is_alive() {
			state.deregister_id(self.backend.as_ref(), &current);
			state.purge_cache(&current);
		}

		let id = state.insert(MapInfo::new(file, header));
		let value = state.lock_value(self.backend.as_ref(), &id);
		Ok((MapGuard::new(self, id, value), true))
	}

	/// Removes the current version of `name`.
	///
	/// Returns true if it was removed immediately; a borrowed version is
	/// marked for removal instead and `false` is returned. Idle values of the
	/// version are dropped in both cases.
	pub fn deregister(&self, name: &str) -> bool {
		self.state.lock().deregister_name(self.backend.as_ref(), name)
	}

	/// Removes every version of every map and empties the idle cache.
	///
	/// Borrowed versions are marked for removal.
	pub fn deregister_all(&self) {
		self.state.lock().deregister_all(self.backend.as_ref());
	}

	/// Returns the latest version of every known map.
	pub fn maps_info(&self) -> Vec<Arc<MapInfo>> {
		let state = self.state.lock();
		state
			.maps
			.values()
			.filter_map(|versions| versions.last().cloned())
			.collect()
	}

	/// True if the latest version of `name` is registered and not pending
	/// removal.
	pub fn is_loaded(&self, name: &str) -> bool {
		let state = self.state.lock();
		let id = state.current_id(name);
		id.is_alive() && id.info().is_registered()
	}

	/// Returns the id of the latest version of `name`, or the null id.
	///
	/// Asking for an unknown map is a caller error and asserts in debug builds.
	pub fn map_id(&self, name: &str) -> MapId {
		let id = self.state.lock().current_id(name);
		debug_assert!(id.is_alive(), "no live map named {name:?}");
		id
	}

	/// Borrows the map identified by `id`.
	///
	/// The guard is inert if the map no longer accepts borrows.
	///
	/// # Panics
	///
	/// Panics if `id` is not alive.
	pub fn lock(&self, id: &MapId) -> MapGuard<'_, V> {
		let value = self.state.lock().lock_value(self.backend.as_ref(), id);
		MapGuard::new(self, id.clone(), value)
	}

	/// Borrows the latest version of `name`.
	///
	/// The guard is inert if no live version exists or it no longer accepts
	/// borrows.
	pub fn lock_by_name(&self, name: &str) -> MapGuard<'_, V> {
		let mut state = self.state.lock();
		let id = state.current_id(name);
		let value = if id.is_alive() {
			state.lock_value(self.backend.as_ref(), &id)
		} else {
			None
		};
		MapGuard::new(self, id, value)
	}

	/// Drops every idle value.
	pub fn clear_cache(&self) {
		self.state.lock().clear_cache();
	}

	/// Number of idle values currently cached.
	pub fn cached_len(&self) -> usize {
		self.state.lock().cache.len()
	}

	/// Maximum number of idle values retained.
	pub fn cache_size(&self) -> usize {
		self.config.cache_size
	}

	fn unlock_value(&self, id: &MapId, value: Arc<V>) {
		self.state
			.lock()
			.unlock_value(self.backend.as_ref(), id, value);
	}
}

impl<V> std::fmt::Debug for MapSet<V>
where
	V: Send + Sync + 'static,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MapSet")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod invariants;
