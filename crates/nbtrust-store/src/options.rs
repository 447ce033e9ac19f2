use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Default number of signatures kept before culling.
pub const DEFAULT_CACHE_SIZE: usize = 65535;

/// Share of the capacity that survives a cull.
pub const TRIM_RATIO: f64 = 0.75;

/// Options for opening a signature store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// Open without write permission; only `check` and `count` are allowed
    /// (default: false).
    pub readonly: bool,
    /// Create the database if it is missing (default: false).
    pub create: bool,
    /// Cull automatically when a store pushes the count past `cache_size`
    /// (default: true). When off, callers must call `cull` themselves.
    pub cull: bool,
    /// Soft capacity of the table (default: 65535).
    pub cache_size: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            readonly: false,
            create: false,
            cull: true,
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl StoreOptions {
    /// Options for a writable store that is created on demand.
    pub fn create() -> Self {
        Self {
            create: true,
            ..Self::default()
        }
    }

    /// Options for a readonly store.
    pub fn readonly() -> Self {
        Self {
            readonly: true,
            ..Self::default()
        }
    }

    /// Rejects option combinations that cannot be honoured.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.cache_size == 0 {
            return Err(StoreError::InvalidOptions(
                "cache_size must be greater than zero".to_string(),
            ));
        }
        if self.readonly && self.create {
            return Err(StoreError::InvalidOptions(
                "a readonly store cannot be created".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of records a cull keeps: `floor(cache_size * 0.75)`, at least one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn retained_after_cull(&self) -> usize {
        ((self.cache_size as f64 * TRIM_RATIO).floor() as usize).max(1)
    }
}
