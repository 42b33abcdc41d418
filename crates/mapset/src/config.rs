//! Registry configuration.
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! cache_size = 64
//!
//! [scales]
//! upper_world_scale = 9
//! upper_scale = 17
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::info::ScaleThresholds;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Idle values kept by default.
pub const DEFAULT_CACHE_SIZE: usize = 32;

/// Tunables for a [`MapSet`](crate::MapSet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSetConfig {
	/// Maximum number of idle opened values retained between borrows.
	pub cache_size: usize,
	/// Thresholds for [`MapInfo::kind`](crate::MapInfo::kind).
	pub scales: ScaleThresholds,
}

impl Default for MapSetConfig {
	fn default() -> Self {
		Self {
			cache_size: DEFAULT_CACHE_SIZE,
			scales: ScaleThresholds::default(),
		}
	}
}

impl MapSetConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	pub fn validate(&self) -> Result<()> {
		if self.cache_size == 0 {
			return Err(ConfigError::InvalidCacheSize);
		}
		Ok(())
	}
}
