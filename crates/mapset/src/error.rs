//! Error types for map registration, backends and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::file::MapVersion;

/// Errors reported by a [`MapBackend`](crate::MapBackend).
#[derive(Debug, Error)]
pub enum BackendError {
	/// The map file could not be read.
	#[error("I/O error reading {path}: {source}")]
	Io {
		/// Path of the map file.
		path: PathBuf,
		/// The underlying I/O error.
		source: std::io::Error,
	},

	/// The map file exists but its header is unusable.
	#[error("invalid map header in {path}: {reason}")]
	InvalidHeader {
		/// Path of the map file.
		path: PathBuf,
		/// What the header reader rejected.
		reason: String,
	},

	#[error("{0}")]
	Other(String),
}

/// Recoverable registration failures.
///
/// Neither variant mutates the registry.
#[derive(Debug, Error)]
pub enum RegisterError {
	/// The version reader rejected the candidate file.
	#[error("invalid map {name}: {source}")]
	InvalidMap {
		/// Map family name.
		name: String,
		/// Reason reported by the backend.
		#[source]
		source: BackendError,
	},

	/// A newer version of the map is already registered.
	#[error("stale map {name}: version {candidate} is older than registered {current}")]
	StaleVersion {
		/// Map family name.
		name: String,
		/// Version currently registered.
		current: MapVersion,
		/// Version that was offered.
		candidate: MapVersion,
	},
}

/// Errors that can occur when loading a [`MapSetConfig`](crate::MapSetConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// The idle cache must be able to hold at least one value.
	#[error("cache_size must be greater than zero")]
	InvalidCacheSize,
}
