//! Host interface seen by the escrow logic
//!
//! The escrow never touches the runtime directly. Storage, events, asset
//! contracts and native value transfers are reached through [`Host`], which
//! [`crate::chain::Chain`] implements. Any call that leaves the escrow
//! (`nft_safe_transfer_from`, `send_value`) may run untrusted code that
//! re-enters the escrow before returning.

use swap_types::ids::{Address, TokenId, Wei};

use crate::errors::{AssetError, ChainError};
use crate::escrow::EscrowStorage;
use crate::events::ContractEvent;

/// Caller identity and native value attached to an escrow call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub value: Wei,
}

impl CallContext {
    pub fn new(caller: Address, value: Wei) -> Self {
        Self { caller, value }
    }

    /// Context for a call that carries no value.
    pub fn unpaid(caller: Address) -> Self {
        Self { caller, value: 0 }
    }
}

/// Everything the escrow needs from its execution environment.
pub trait Host {
    /// Address the escrow runs under; the operator for asset transfers.
    fn escrow_address(&self) -> Address;

    fn storage(&self) -> &EscrowStorage;

    fn storage_mut(&mut self) -> &mut EscrowStorage;

    /// Append an event to the log of the current call.
    fn emit(&mut self, event: ContractEvent);

    /// Ask `contract` to move `token_id` from `from` to `to` with the escrow
    /// as operator. May re-enter the escrow.
    fn nft_safe_transfer_from(
        &mut self,
        contract: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError>;

    fn nft_owner_of(&self, contract: Address, token_id: TokenId) -> Result<Address, AssetError>;

    fn nft_get_approved(
        &self,
        contract: Address,
        token_id: TokenId,
    ) -> Result<Option<Address>, AssetError>;

    fn nft_is_approved_for_all(
        &self,
        contract: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool, AssetError>;

    /// Send native value from the escrow to `to`, running any receiver code
    /// attached to `to`. May re-enter the escrow.
    fn send_value(&mut self, to: Address, amount: Wei) -> Result<(), ChainError>;
}
