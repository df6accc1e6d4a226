//! Asset contracts and account code
//!
//! [`NftContract`] is the interface the escrow uses to move non-fungible
//! tokens. [`Receiver`] is code attached to an account that runs when the
//! account receives native value or a token. Both are handed the
//! [`Chain`] while they run and may call back into any entry point.
//!
//! [`StandardNft`] is a reference ERC-721 style implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use swap_types::ids::{Address, TokenId, Wei};

use crate::chain::Chain;
use crate::errors::{AssetError, ChainError};

/// A single token transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    /// Contract the token lives in.
    pub contract: Address,
    /// Account performing the transfer.
    pub operator: Address,
    pub from: Address,
    pub to: Address,
    pub token_id: TokenId,
}

/// ERC-721 style asset contract.
pub trait NftContract: fmt::Debug {
    fn owner_of(&self, token_id: TokenId) -> Result<Address, AssetError>;

    /// Account approved for `token_id`, if any.
    fn get_approved(&self, token_id: TokenId) -> Result<Option<Address>, AssetError>;

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Approve `approved` for `token_id`, or clear the approval with `None`.
    fn approve(
        &mut self,
        caller: Address,
        approved: Option<Address>,
        token_id: TokenId,
    ) -> Result<(), AssetError>;

    fn set_approval_for_all(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), AssetError>;

    /// Move a token, checking ownership and authorization of the operator.
    /// Implementations notify the recipient through
    /// [`Chain::notify_nft_received`].
    fn safe_transfer_from(
        &mut self,
        chain: &mut Chain,
        transfer: &NftTransfer,
    ) -> Result<(), AssetError>;

    fn box_clone(&self) -> Box<dyn NftContract>;
}

impl Clone for Box<dyn NftContract> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Code attached to an account. Either hook may reject by returning an
/// error, which reverts the enclosing send or transfer.
pub trait Receiver: fmt::Debug {
    /// Runs after `amount` has been credited to `account`'s native balance.
    fn on_value_received(
        &mut self,
        _chain: &mut Chain,
        _account: Address,
        _from: Address,
        _amount: Wei,
    ) -> Result<(), ChainError> {
        Ok(())
    }

    /// Runs after `account` has become the owner of the transferred token.
    fn on_nft_received(
        &mut self,
        _chain: &mut Chain,
        _account: Address,
        _transfer: &NftTransfer,
    ) -> Result<(), ChainError> {
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Receiver>;
}

impl Clone for Box<dyn Receiver> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Reference ERC-721 style token contract.
#[derive(Debug, Clone, Default)]
pub struct StandardNft {
    name: String,
    owners: BTreeMap<TokenId, Address>,
    token_approvals: BTreeMap<TokenId, Address>,
    operator_approvals: BTreeSet<(Address, Address)>,
}

impl StandardNft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Mint `token_id` to `owner` at construction.
    pub fn mint(mut self, owner: Address, token_id: TokenId) -> Self {
        self.owners.insert(token_id, owner);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tokens held by `owner`.
    pub fn balance_of(&self, owner: Address) -> usize {
        self.owners.values().filter(|o| **o == owner).count()
    }

    fn is_authorized(&self, owner: Address, operator: Address, token_id: TokenId) -> bool {
        operator == owner
            || self.token_approvals.get(&token_id) == Some(&operator)
            || self.operator_approvals.contains(&(owner, operator))
    }
}

impl NftContract for StandardNft {
    fn owner_of(&self, token_id: TokenId) -> Result<Address, AssetError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(AssetError::NonexistentToken { token_id })
    }

    fn get_approved(&self, token_id: TokenId) -> Result<Option<Address>, AssetError> {
        self.owner_of(token_id)?;
        Ok(self.token_approvals.get(&token_id).copied())
    }

    fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operator_approvals.contains(&(owner, operator))
    }

    fn approve(
        &mut self,
        caller: Address,
        approved: Option<Address>,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let owner = self.owner_of(token_id)?;
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(AssetError::NotAuthorized {
                operator: caller,
                token_id,
            });
        }

        match approved {
            Some(to) if to == owner => Err(AssetError::Reverted {
                reason: "approval to current owner".to_string(),
            }),
            Some(to) => {
                self.token_approvals.insert(token_id, to);
                Ok(())
            }
            None => {
                self.token_approvals.remove(&token_id);
                Ok(())
            }
        }
    }

    fn set_approval_for_all(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), AssetError> {
        if caller == operator {
            return Err(AssetError::Reverted {
                reason: "approve to caller".to_string(),
            });
        }
        if approved {
            self.operator_approvals.insert((caller, operator));
        } else {
            self.operator_approvals.remove(&(caller, operator));
        }
        Ok(())
    }

    fn safe_transfer_from(
        &mut self,
        chain: &mut Chain,
        transfer: &NftTransfer,
    ) -> Result<(), AssetError> {
        let token_id = transfer.token_id;
        let owner = self.owner_of(token_id)?;

        if owner != transfer.from {
            return Err(AssetError::NotOwner {
                token_id,
                from: transfer.from,
            });
        }
        if transfer.to.is_zero() {
            return Err(AssetError::ZeroRecipient);
        }
        if !self.is_authorized(owner, transfer.operator, token_id) {
            return Err(AssetError::NotAuthorized {
                operator: transfer.operator,
                token_id,
            });
        }

        self.token_approvals.remove(&token_id);
        self.owners.insert(token_id, transfer.to);

        chain.notify_nft_received(transfer)
    }

    fn box_clone(&self) -> Box<dyn NftContract> {
        Box::new(self.clone())
    }
}
