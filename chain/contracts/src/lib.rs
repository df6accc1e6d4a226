//! Escrow Contract Logic for Two-Party NFT Swaps
//!
//! This crate implements a trust-minimized escrow that lets two parties swap
//! one non-fungible token each, optionally sweetened by native value paid in
//! one direction only. Only a digest of each swap's terms is stored; callers
//! resubmit the full terms on every later call.
//!
//! # Modules
//! - `commitment`: Terms hashing and the swap id -> digest registry
//! - `ledger`: Withdrawable balances credited by completion and cancellation
//! - `escrow`: Swap state machine (initiate, complete, remove, status)
//! - `withdrawal`: Pull payment of ledger balances
//! - `host`: Interface the escrow uses to reach its environment
//! - `chain`: Execution runtime with atomic, reentrant call frames
//! - `nft`: Asset contract and account code interfaces, reference NFT
//! - `events`: Contract events
//! - `errors`: Contract-specific error types
//! - `config`: Runtime configuration
//!
//! # Version
//! v0.1.0

pub mod chain;
pub mod commitment;
pub mod config;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod host;
pub mod ledger;
pub mod nft;
pub mod withdrawal;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
