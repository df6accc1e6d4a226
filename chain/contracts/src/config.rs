//! Runtime configuration

use serde::{Deserialize, Serialize};
use swap_types::ids::{Address, Wei};

/// Configuration for a [`crate::chain::Chain`].
///
/// Missing fields take their default when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Address the escrow is deployed at.
    pub escrow_address: Address,
    /// Maximum nesting of call frames (default: 64).
    pub max_call_depth: usize,
    /// Value attached at deployment. Held by the escrow, never credited
    /// to any ledger account.
    pub initial_escrow_funding: Wei,
}

impl ChainConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            escrow_address: Address::from_low_u64_be(0xe5c0),
            max_call_depth: 64,
            initial_escrow_funding: 0,
        }
    }
}
