//! On-disk identity of a map pack.

use std::fmt;
use std::path::{Path, PathBuf};

/// File extension of map packs, including the leading dot.
pub const MAP_FILE_EXTENSION: &str = ".mwm";

/// Data version stamp of a map pack, conventionally `yymmdd`.
///
/// Higher versions supersede lower ones for the same map name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MapVersion(pub u64);

impl fmt::Display for MapVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}", self.0)
	}
}

impl From<u64> for MapVersion {
	fn from(value: u64) -> Self {
		Self(value)
	}
}

/// A map pack located in a local directory.
///
/// This is the identity handed to every [`MapBackend`](crate::MapBackend)
/// call; the registry never inspects the file itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalMapFile {
	directory: PathBuf,
	name: String,
	version: MapVersion,
}

impl LocalMapFile {
	/// Creates a file identity for map `name` stored in `directory`.
	pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>, version: MapVersion) -> Self {
		Self {
			directory: directory.into(),
			name: name.into(),
			version,
		}
	}

	/// Map family name (the file stem, without extension).
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> MapVersion {
		self.version
	}

	pub fn directory(&self) -> &Path {
		&self.directory
	}

	/// Full path of the map file.
	pub fn path(&self) -> PathBuf {
		self.directory.join(format!("{}{MAP_FILE_EXTENSION}", self.name))
	}
}

impl fmt::Display for LocalMapFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.name, self.version)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_appends_extension() {
		let file = LocalMapFile::new("/maps/150101", "Angola", MapVersion(150101));
		assert_eq!(file.path(), PathBuf::from("/maps/150101/Angola.mwm"));
		assert_eq!(file.to_string(), "Angola@v150101");
	}

	#[test]
	fn versions_order_numerically() {
		assert!(MapVersion(150101) < MapVersion(150201));
		assert_eq!(MapVersion::from(7), MapVersion(7));
	}
}
