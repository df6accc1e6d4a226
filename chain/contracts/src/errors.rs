//! Contract-specific error types
//!
//! Every failure reverts the whole call frame it happens in, so none of
//! these errors leaves partial state behind.

use swap_types::ids::{Address, TokenId, Wei};
use thiserror::Error;

/// Swap state machine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("Zero address disallowed")]
    ZeroAddress,

    #[error("Initiator mismatch: expected {expected}, actual {actual}")]
    InitiatorMismatch { expected: Address, actual: Address },

    #[error("Initiator ETH portion mismatch: expected {expected}, attached {attached}")]
    InitiatorEthPortionMismatch { expected: Wei, attached: Wei },

    #[error("Two-way ETH portions disallowed")]
    TwoWayEthPortions,

    #[error("Swap already completed or does not exist")]
    SwapNotFound,

    #[error("Not acceptor")]
    NotAcceptor,

    #[error("Not initiator")]
    NotInitiator,

    #[error("Incorrect or missing acceptor ETH: expected {expected}")]
    AcceptorEthMismatch { expected: Wei },

    #[error("Swap id counter exhausted")]
    SwapIdOverflow,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Balance ledger errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Empty withdraw disallowed")]
    EmptyWithdraw,

    #[error("Arithmetic overflow in balance of {account}")]
    Overflow { account: Address },

    #[error("ETH sending failed: {amount} to {account}")]
    EthSendFailed { account: Address, amount: Wei },
}

/// Failures raised by (or while calling) an external asset contract
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("No asset contract deployed at {contract}")]
    UnknownContract { contract: Address },

    #[error("Nonexistent token: {token_id}")]
    NonexistentToken { token_id: TokenId },

    #[error("Transfer from incorrect owner: token {token_id} is not owned by {from}")]
    NotOwner { token_id: TokenId, from: Address },

    #[error("Caller {operator} is not token owner or approved for token {token_id}")]
    NotAuthorized { operator: Address, token_id: TokenId },

    #[error("Transfer to the zero address")]
    ZeroRecipient,

    #[error("Receiver {receiver} rejected token {token_id}")]
    ReceiverRejected { receiver: Address, token_id: TokenId },

    #[error("Asset contract reverted: {reason}")]
    Reverted { reason: String },

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Execution runtime errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Insufficient funds for {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: Address,
        required: Wei,
        available: Wei,
    },

    #[error("Arithmetic overflow in native balance of {account}")]
    BalanceOverflow { account: Address },

    #[error("Call depth exceeded: limit {limit}")]
    CallDepthExceeded { limit: usize },

    #[error("Account {account} reverted: {reason}")]
    Reverted { account: Address, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_error_display() {
        assert_eq!(
            SwapError::SwapNotFound.to_string(),
            "Swap already completed or does not exist"
        );
        assert_eq!(
            SwapError::TwoWayEthPortions.to_string(),
            "Two-way ETH portions disallowed"
        );
    }

    #[test]
    fn test_initiator_mismatch_carries_both_identities() {
        let err = SwapError::InitiatorMismatch {
            expected: Address::from_low_u64_be(1),
            actual: Address::from_low_u64_be(2),
        };
        let text = err.to_string();
        assert!(text.contains(&Address::from_low_u64_be(1).to_string()));
        assert!(text.contains(&Address::from_low_u64_be(2).to_string()));
    }

    #[test]
    fn test_acceptor_eth_mismatch_carries_expected() {
        let err = SwapError::AcceptorEthMismatch { expected: 42 };
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_swap_error_from_ledger() {
        let err: SwapError = LedgerError::EmptyWithdraw.into();
        assert!(matches!(err, SwapError::Ledger(LedgerError::EmptyWithdraw)));
        assert_eq!(err.to_string(), "Ledger error: Empty withdraw disallowed");
    }

    #[test]
    fn test_asset_error_from_chain() {
        let err: AssetError = ChainError::CallDepthExceeded { limit: 8 }.into();
        assert!(matches!(err, AssetError::Chain(_)));
    }
}
