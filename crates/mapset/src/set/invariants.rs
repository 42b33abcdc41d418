//! Property tests for the registry lifecycle.
//!
//! Random sequences of registrations, removals and borrows on a couple of map
//! names, checking after every step that:
//!
//! - enumeration never yields a deregistered version;
//! - every version's borrow count equals the number of live guards on it;
//! - the idle cache stays within capacity;
//! - each removed version was reported to the backend exactly once.

use std::collections::HashMap;

use proptest::prelude::*;

use super::tests::{MockValue, file, map_set};
use super::*;

const NAMES: [&str; 2] = ["Chad", "Niger"];

#[derive(Debug, Clone)]
enum Op {
	Register { name: usize, version: u64 },
	Deregister { name: usize },
	DeregisterAll,
	Borrow { name: usize },
	Release { slot: usize },
	ClearCache,
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		4 => (0..NAMES.len(), 1u64..5).prop_map(|(name, version)| Op::Register { name, version }),
		2 => (0..NAMES.len()).prop_map(|name| Op::Deregister { name }),
		1 => Just(Op::DeregisterAll),
		3 => (0..NAMES.len()).prop_map(|name| Op::Borrow { name }),
		3 => any::<usize>().prop_map(|slot| Op::Release { slot }),
		1 => Just(Op::ClearCache),
	]
}

fn check(set: &MapSet<MockValue>, held: &[MapGuard<'_, MockValue>], records: &[MapId]) {
	for info in set.maps_info() {
		assert_ne!(info.status(), MapStatus::Deregistered, "{info:?} enumerated after removal");
	}

	let mut live: HashMap<MapId, usize> = HashMap::new();
	for guard in held {
		assert!(guard.is_locked());
		*live.entry(guard.id().clone()).or_default() += 1;
	}
	for (id, count) in &live {
		assert_eq!(id.info().borrow_count(), *count, "borrow count of {id}");
	}
	for id in records.iter().filter(|id| !live.contains_key(*id)) {
		assert_eq!(id.info().borrow_count(), 0, "borrow count of unborrowed {id}");
	}

	assert!(set.cached_len() <= set.cache_size());
}

proptest! {
	#[test]
	fn lifecycle_invariants_hold(ops in prop::collection::vec(op(), 1..60), cache_size in 1usize..4) {
		let (set, probe) = map_set(cache_size);
		let mut held: Vec<MapGuard<'_, _>> = Vec::new();
		let mut records: Vec<MapId> = Vec::new();

		for op in ops {
			match op {
				Op::Register { name, version } => {
					let before = set.maps_info();
					match set.register(file(NAMES[name], version)) {
						Ok((guard, added)) => {
							prop_assert!(guard.is_locked());
							if added {
								records.push(guard.id().clone());
							} else {
								prop_assert_eq!(guard.info().version().0, version);
							}
							held.push(guard);
						}
						Err(RegisterError::StaleVersion { current, candidate, .. }) => {
							prop_assert!(current > candidate);
							let after = set.maps_info();
							prop_assert_eq!(before.len(), after.len());
						}
						Err(err) => prop_assert!(false, "unexpected error: {}", err),
					}
				}
				Op::Deregister { name } => {
					set.deregister(NAMES[name]);
				}
				Op::DeregisterAll => set.deregister_all(),
				Op::Borrow { name } => {
					let guard = set.lock_by_name(NAMES[name]);
					if guard.is_locked() {
						held.push(guard);
					} else if guard.id().is_alive() {
						prop_assert!(!guard.id().info().is_up_to_date());
					}
				}
				Op::Release { slot } => {
					if !held.is_empty() {
						let guard = held.remove(slot % held.len());
						drop(guard);
					}
				}
				Op::ClearCache => set.clear_cache(),
			}
			check(&set, &held, &records);
		}

		held.clear();
		set.deregister_all();

		prop_assert!(set.maps_info().is_empty());
		prop_assert_eq!(set.cached_len(), 0);
		for id in &records {
			prop_assert_eq!(id.info().status(), MapStatus::Deregistered);
			prop_assert_eq!(id.info().borrow_count(), 0);
		}
		prop_assert_eq!(probe.removed().len(), records.len());
	}
}
