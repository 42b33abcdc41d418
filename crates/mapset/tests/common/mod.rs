//! Shared backend for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use xeno_mapset::{BackendError, LocalMapFile, MapBackend, MapHeader, MapSet, MapVersion};

/// Opened value produced by [`CountingBackend`].
#[derive(Debug)]
pub struct OpenedMap {
	pub file: LocalMapFile,
}

#[derive(Default)]
pub struct Counters {
	pub opens: AtomicUsize,
	pub removed: Mutex<Vec<LocalMapFile>>,
}

impl Counters {
	pub fn opens(&self) -> usize {
		self.opens.load(Ordering::SeqCst)
	}

	pub fn removed(&self) -> Vec<LocalMapFile> {
		self.removed.lock().clone()
	}
}

/// Backend that accepts every file and records opens and removals.
pub struct CountingBackend {
	counters: Arc<Counters>,
}

impl MapBackend for CountingBackend {
	type Value = OpenedMap;

	fn read_header(&self, _file: &LocalMapFile) -> Result<MapHeader, BackendError> {
		Ok(MapHeader {
			min_scale: 1,
			max_scale: 17,
			format_version: 8,
		})
	}

	fn open(&self, file: &LocalMapFile) -> Result<OpenedMap, BackendError> {
		self.counters.opens.fetch_add(1, Ordering::SeqCst);
		Ok(OpenedMap { file: file.clone() })
	}

	fn on_removed(&self, file: &LocalMapFile) {
		self.counters.removed.lock().push(file.clone());
	}
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::INFO)
		.try_init();
}

pub fn map_set(cache_size: usize) -> (MapSet<OpenedMap>, Arc<Counters>) {
	init_tracing();
	let counters = Arc::new(Counters::default());
	let backend = CountingBackend {
		counters: Arc::clone(&counters),
	};
	(MapSet::with_cache_size(backend, cache_size), counters)
}

pub fn file(name: &str, version: u64) -> LocalMapFile {
	LocalMapFile::new("/maps", name, MapVersion(version))
}
