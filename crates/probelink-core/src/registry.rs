//! Identifier registry - Maps firmware naming fragments to numeric IDs
//!
//! The registry carries two tables kept in sync with the supported
//! hardware: HDK name fragments to hardware IDs, and full firmware
//! names to board IDs. Discovery consults it, never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read identifier registry: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse identifier registry: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Static lookup tables for firmware classification.
///
/// Passed explicitly into the discovery functions so tests can
/// substitute fixtures without touching shared state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentifierRegistry {
    /// HDK name fragment (e.g. "k20dx") to hardware ID
    #[serde(default)]
    pub hdks: HashMap<String, u32>,
    /// Full firmware name (e.g. "k20dx_frdmk22f_if") to board ID
    #[serde(default)]
    pub boards: HashMap<String, u16>,
}

impl IdentifierRegistry {
    /// Load the registry from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the registry from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, RegistryError> {
        Ok(toml::from_str(content)?)
    }

    /// Look up the hardware ID for an HDK name fragment
    pub fn hdk_id(&self, fragment: &str) -> Option<u32> {
        self.hdks.get(fragment).copied()
    }

    /// Look up the board ID for a full firmware name
    pub fn board_id(&self, name: &str) -> Option<u16> {
        self.boards.get(name).copied()
    }

    /// Register an HDK fragment
    pub fn add_hdk(&mut self, fragment: impl Into<String>, id: u32) {
        self.hdks.insert(fragment.into(), id);
    }

    /// Register a firmware name
    pub fn add_board(&mut self, name: impl Into<String>, id: u16) {
        self.boards.insert(name.into(), id);
    }
}
