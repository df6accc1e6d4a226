//! Contract events
//!
//! Events are immutable records emitted by successful escrow operations.
//! Swap terms are carried in full so off-chain indexers can rebuild and
//! re-hash them; the escrow itself only keeps the digest.

use serde::{Deserialize, Serialize};
use swap_types::ids::{Address, SwapId, Wei};
use swap_types::swap::SwapTerms;

/// A swap was committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapInitiated {
    pub swap_id: SwapId,
    pub initiator: Address,
    pub acceptor: Address,
    pub terms: SwapTerms,
}

/// A swap was fulfilled by its acceptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapComplete {
    pub swap_id: SwapId,
    pub initiator: Address,
    pub acceptor: Address,
    pub terms: SwapTerms,
}

/// A swap was cancelled by its initiator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRemoved {
    pub swap_id: SwapId,
    pub initiator: Address,
}

/// A ledger balance was paid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceWithdrawn {
    pub account: Address,
    pub amount: Wei,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    SwapInitiated(SwapInitiated),
    SwapComplete(SwapComplete),
    SwapRemoved(SwapRemoved),
    BalanceWithdrawn(BalanceWithdrawn),
}

impl ContractEvent {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            ContractEvent::SwapInitiated(_) => "SwapInitiated",
            ContractEvent::SwapComplete(_) => "SwapComplete",
            ContractEvent::SwapRemoved(_) => "SwapRemoved",
            ContractEvent::BalanceWithdrawn(_) => "BalanceWithdrawn",
        }
    }
}
