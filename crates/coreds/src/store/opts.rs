use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on the record count a single range request may ask for.
pub const MAX_FETCH_LIMIT: usize = u32::MAX as usize;

#[derive(Debug, Error)]
pub enum OptsError {
    #[error("page_size must be at least 1")]
    ZeroPageSize,
    #[error("multiplier must be at least 1")]
    ZeroMultiplier,
    #[error("page_size * multiplier must stay below u32::MAX")]
    TooLarge,
    #[error("invalid store options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Paging configuration for a [`WindowStore`](super::WindowStore).
///
/// `multiplier` scales how many pages a bulk fetch asks for: an initial load
/// requests `page_size * multiplier + 1` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOpts {
    pub page_size: usize,
    pub multiplier: usize,
}

impl Default for StoreOpts {
    fn default() -> Self {
        Self {
            page_size: 10,
            multiplier: 3,
        }
    }
}

impl StoreOpts {
    pub fn new(page_size: usize, multiplier: usize) -> Self {
        Self {
            page_size,
            multiplier,
        }
    }

    pub fn validate(&self) -> Result<(), OptsError> {
        if self.page_size == 0 {
            return Err(OptsError::ZeroPageSize);
        }
        if self.multiplier == 0 {
            return Err(OptsError::ZeroMultiplier);
        }
        // an initial load asks for one record past the bulk window
        match self.page_size.checked_mul(self.multiplier) {
            Some(bulk) if bulk < MAX_FETCH_LIMIT => Ok(()),
            _ => Err(OptsError::TooLarge),
        }
    }

    /// Parses `{"pageSize":..,"multiplier":..}`; missing keys keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, OptsError> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }
}
