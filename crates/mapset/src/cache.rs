//! Bounded pool of opened values that are not currently borrowed.
//!
//! Entries leave in insertion order when the pool overflows, regardless of how
//! recently they were used. A borrow that finds its map here takes the entry
//! out instead of opening the file again.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::id::MapId;

pub(crate) struct IdleCache<V> {
	entries: VecDeque<(MapId, Arc<V>)>,
	capacity: usize,
}

impl<V> IdleCache<V> {
	pub fn new(capacity: usize) -> Self {
		Self {
			entries: VecDeque::new(),
			capacity,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Removes and returns the first idle value for `id`.
	pub fn take(&mut self, id: &MapId) -> Option<Arc<V>> {
		let pos = self.entries.iter().position(|(cached, _)| cached == id)?;
		self.entries.remove(pos).map(|(_, value)| value)
	}

	/// Appends an idle value, returning the id of the entry evicted to stay
	/// within capacity, if any.
	pub fn push(&mut self, id: MapId, value: Arc<V>) -> Option<MapId> {
		self.entries.push_back((id, value));
		if self.entries.len() <= self.capacity {
			return None;
		}
		debug_assert_eq!(self.entries.len(), self.capacity + 1);
		self.entries.pop_front().map(|(evicted, _)| evicted)
	}

	/// Drops every idle value for `id` and returns how many were dropped.
	pub fn purge(&mut self, id: &MapId) -> usize {
		let before = self.entries.len();
		self.entries.retain(|(cached, _)| cached != id);
		before - self.entries.len()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	#[cfg(test)]
	pub fn ids(&self) -> Vec<MapId> {
		self.entries.iter().map(|(id, _)| id.clone()).collect()
	}
}
