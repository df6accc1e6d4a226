//! Swap State Machine — initiate, complete, remove, status
//!
//! Every state-changing operation follows checks-effects-interactions:
//! all preconditions are checked first, the commitment and ledger are
//! updated next, and only then are asset contracts called. A reentrant
//! call made from inside an asset transfer sees the swap already closed
//! and fails the ordinary hash check.

use serde::{Deserialize, Serialize};
use swap_types::ids::{Address, SwapId, TokenId};
use swap_types::swap::SwapTerms;
use tracing::info;

use crate::commitment::CommitmentStore;
use crate::errors::{AssetError, SwapError};
use crate::events::{ContractEvent, SwapComplete, SwapInitiated, SwapRemoved};
use crate::host::{CallContext, Host};
use crate::ledger::BalanceLedger;

/// Persistent escrow state.
#[derive(Debug, Clone, Default)]
pub struct EscrowStorage {
    pub commitments: CommitmentStore,
    pub ledger: BalanceLedger,
}

impl EscrowStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advisory readiness report for an open swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStatus {
    pub initiator_owns_token: bool,
    pub initiator_approvals_set: bool,
    pub acceptor_owns_token: bool,
    pub acceptor_approvals_set: bool,
}

impl SwapStatus {
    /// Whether both transfers would currently be authorized.
    pub fn is_ready(&self) -> bool {
        self.initiator_owns_token
            && self.initiator_approvals_set
            && self.acceptor_owns_token
            && self.acceptor_approvals_set
    }
}

/// Commit to `terms` and return the new swap id.
///
/// The attached value stays in the escrow's own balance; nothing is
/// credited to the ledger until the swap is completed or removed.
pub fn initiate_swap<H: Host + ?Sized>(
    host: &mut H,
    msg: &CallContext,
    terms: SwapTerms,
) -> Result<SwapId, SwapError> {
    if terms.has_zero_address() {
        return Err(SwapError::ZeroAddress);
    }
    if msg.caller != terms.initiator {
        return Err(SwapError::InitiatorMismatch {
            expected: terms.initiator,
            actual: msg.caller,
        });
    }
    if msg.value != terms.initiator_eth_portion {
        return Err(SwapError::InitiatorEthPortionMismatch {
            expected: terms.initiator_eth_portion,
            attached: msg.value,
        });
    }
    if msg.value > 0 && terms.acceptor_eth_portion > 0 {
        return Err(SwapError::TwoWayEthPortions);
    }

    let (swap_id, _) = host.storage_mut().commitments.open(&terms)?;

    info!(
        swap_id = %swap_id,
        initiator = %msg.caller,
        acceptor = %terms.acceptor,
        initiator_eth_portion = terms.initiator_eth_portion,
        acceptor_eth_portion = terms.acceptor_eth_portion,
        "Swap initiated"
    );

    host.emit(ContractEvent::SwapInitiated(SwapInitiated {
        swap_id,
        initiator: msg.caller,
        acceptor: terms.acceptor,
        terms,
    }));
    Ok(swap_id)
}

/// Fulfil an open swap as its acceptor.
///
/// The commitment is deleted and the ledger credited before either asset
/// contract is called. If a transfer fails the caller's frame reverts and
/// all of it is undone.
pub fn complete_swap<H: Host + ?Sized>(
    host: &mut H,
    msg: &CallContext,
    swap_id: SwapId,
    terms: &SwapTerms,
) -> Result<(), SwapError> {
    host.storage().commitments.verify(swap_id, terms)?;

    if msg.caller != terms.acceptor {
        return Err(SwapError::NotAcceptor);
    }
    if terms.initiator_eth_portion > 0 && msg.value > 0 {
        return Err(SwapError::TwoWayEthPortions);
    }
    if msg.value != terms.acceptor_eth_portion {
        return Err(SwapError::AcceptorEthMismatch {
            expected: terms.acceptor_eth_portion,
        });
    }

    // Effects
    let storage = host.storage_mut();
    storage.commitments.close(swap_id);
    if msg.value > 0 {
        storage.ledger.credit(terms.initiator, msg.value)?;
    }
    if terms.initiator_eth_portion > 0 {
        storage
            .ledger
            .credit(terms.acceptor, terms.initiator_eth_portion)?;
    }

    host.emit(ContractEvent::SwapComplete(SwapComplete {
        swap_id,
        initiator: terms.initiator,
        acceptor: terms.acceptor,
        terms: terms.clone(),
    }));

    // Interactions
    host.nft_safe_transfer_from(
        terms.initiator_nft_contract,
        terms.initiator,
        terms.acceptor,
        terms.initiator_token_id,
    )?;
    host.nft_safe_transfer_from(
        terms.acceptor_nft_contract,
        terms.acceptor,
        terms.initiator,
        terms.acceptor_token_id,
    )?;

    info!(
        swap_id = %swap_id,
        initiator = %terms.initiator,
        acceptor = %terms.acceptor,
        "Swap completed"
    );
    Ok(())
}

/// Cancel an open swap as its initiator, returning any escrowed portion
/// through the ledger. No asset moves.
pub fn remove_swap<H: Host + ?Sized>(
    host: &mut H,
    msg: &CallContext,
    swap_id: SwapId,
    terms: &SwapTerms,
) -> Result<(), SwapError> {
    host.storage().commitments.verify(swap_id, terms)?;

    if msg.caller != terms.initiator {
        return Err(SwapError::NotInitiator);
    }

    let storage = host.storage_mut();
    storage.commitments.close(swap_id);
    if terms.initiator_eth_portion > 0 {
        storage
            .ledger
            .credit(msg.caller, terms.initiator_eth_portion)?;
    }

    info!(
        swap_id = %swap_id,
        initiator = %msg.caller,
        refunded = terms.initiator_eth_portion,
        "Swap removed"
    );

    host.emit(ContractEvent::SwapRemoved(SwapRemoved {
        swap_id,
        initiator: msg.caller,
    }));
    Ok(())
}

/// Report whether each side could complete `swap_id` right now.
///
/// Purely advisory; completion never calls this. A token the asset
/// contract does not know reports as not owned and not approved.
pub fn get_swap_status<H: Host + ?Sized>(
    host: &H,
    swap_id: SwapId,
    terms: &SwapTerms,
) -> Result<SwapStatus, SwapError> {
    host.storage().commitments.verify(swap_id, terms)?;

    let (initiator_owns_token, initiator_approvals_set) = side_status(
        host,
        terms.initiator_nft_contract,
        terms.initiator,
        terms.initiator_token_id,
    )?;
    let (acceptor_owns_token, acceptor_approvals_set) = side_status(
        host,
        terms.acceptor_nft_contract,
        terms.acceptor,
        terms.acceptor_token_id,
    )?;

    Ok(SwapStatus {
        initiator_owns_token,
        initiator_approvals_set,
        acceptor_owns_token,
        acceptor_approvals_set,
    })
}

fn side_status<H: Host + ?Sized>(
    host: &H,
    contract: Address,
    party: Address,
    token_id: TokenId,
) -> Result<(bool, bool), SwapError> {
    let escrow = host.escrow_address();

    let owner = match host.nft_owner_of(contract, token_id) {
        Ok(owner) => owner,
        Err(AssetError::NonexistentToken { .. }) => return Ok((false, false)),
        Err(e) => return Err(e.into()),
    };
    // Operator approval only authorizes the escrow for the actual owner
    let approved = host.nft_get_approved(contract, token_id)? == Some(escrow)
        || host.nft_is_approved_for_all(contract, owner, escrow)?;

    Ok((owner == party, approved))
}
