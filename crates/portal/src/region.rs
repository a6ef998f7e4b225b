//! Bank identifier to regional portal URL.

use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info};
use url::Url;

use crate::errors::{PortalError, Result};

const EMBEDDED_REGIONS: &str = include_str!("../regions.json");

/// Static table of the group's regional portals.
///
/// Loaded once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RegionTable {
    entries: HashMap<String, String>,
}

impl RegionTable {
    /// Table shipped with the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_REGIONS)
    }

    /// Loads an override table from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PortalError::RegionTable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parses a `{ "bankId": "https://..." }` object.
    ///
    /// Every URL must parse; trailing slashes are dropped so paths can be
    /// appended with `format!("{}/...")`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, String> =
            serde_json::from_str(raw).map_err(|e| PortalError::RegionTable(e.to_string()))?;

        let mut entries = HashMap::with_capacity(parsed.len());
        for (bank_id, url) in parsed {
            let url = url.trim().trim_end_matches('/').to_string();
            if url.is_empty() {
                return Err(PortalError::RegionTable(format!("empty URL for {}", bank_id)));
            }
            Url::parse(&url).map_err(|source| PortalError::InvalidUrl {
                url: url.clone(),
                source,
            })?;
            entries.insert(bank_id, url);
        }
        Ok(Self { entries })
    }

    /// Base portal URL of `bank_id`.
    pub fn resolve(&self, bank_id: &str) -> Result<&str> {
        match self.entries.get(bank_id) {
            Some(url) => {
                info!("Bank url is {}", url);
                Ok(url)
            }
            None => {
                error!("The bank id {} is unknown", bank_id);
                Err(PortalError::UnknownBank(bank_id.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
