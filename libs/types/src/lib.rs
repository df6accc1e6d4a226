//! Types library for the NFT swap escrow
//!
//! Shared type definitions used by the escrow contracts and anything that
//! builds or indexes swaps off-chain.
//!
//! # Modules
//! - `ids`: Addresses, swap identifiers, token id and amount aliases
//! - `swap`: Swap terms and their canonical encoding

pub mod ids;
pub mod swap;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::swap::*;
}
