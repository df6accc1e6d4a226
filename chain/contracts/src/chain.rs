//! Execution runtime — world state, call frames, entry points
//!
//! A [`Chain`] holds every account's native balance, the escrow's storage,
//! deployed asset contracts and code attached to accounts. Each entry point
//! and each outbound call runs in a frame:
//! - The world is snapshotted on entry and restored on error, events included
//! - Nested frames revert only themselves unless the error is propagated
//! - Frames deeper than `max_call_depth` fail before running
//!
//! Contracts and account code are taken out of the world while they run
//! and put back afterwards. A call back into code that is still running
//! reverts.

use std::collections::{BTreeMap, BTreeSet};

use swap_types::ids::{Address, SwapId, TokenId, Wei};
use swap_types::swap::SwapTerms;
use tracing::{debug, info, warn};

use crate::commitment::TermsHash;
use crate::config::ChainConfig;
use crate::errors::{AssetError, ChainError, SwapError};
use crate::escrow::{self, EscrowStorage, SwapStatus};
use crate::events::ContractEvent;
use crate::host::{CallContext, Host};
use crate::ledger::BalanceLedger;
use crate::nft::{NftContract, NftTransfer, Receiver};
use crate::withdrawal;

/// Everything a frame snapshots.
#[derive(Debug, Clone, Default)]
struct World {
    native: BTreeMap<Address, Wei>,
    total_supply: Wei,
    storage: EscrowStorage,
    nfts: BTreeMap<Address, Box<dyn NftContract>>,
    receivers: BTreeMap<Address, Box<dyn Receiver>>,
    events: Vec<ContractEvent>,
}

/// Single-threaded ledger hosting one escrow.
#[derive(Debug)]
pub struct Chain {
    config: ChainConfig,
    world: World,
    depth: usize,
    /// Contracts and accounts whose code is currently running
    executing: BTreeSet<Address>,
}

impl Chain {
    /// Create a chain with the escrow deployed at `config.escrow_address`,
    /// holding `config.initial_escrow_funding`.
    pub fn new(config: ChainConfig) -> Self {
        let mut world = World::default();
        if config.initial_escrow_funding > 0 {
            world
                .native
                .insert(config.escrow_address, config.initial_escrow_funding);
            world.total_supply = config.initial_escrow_funding;
        }

        info!(
            escrow = %config.escrow_address,
            funding = config.initial_escrow_funding,
            max_call_depth = config.max_call_depth,
            "Escrow deployed"
        );

        Self {
            config,
            world,
            depth: 0,
            executing: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    // ─── Genesis & deployment ───

    /// Mint native value to `account`.
    pub fn fund(&mut self, account: Address, amount: Wei) -> Result<(), ChainError> {
        let balance = self
            .native_balance(&account)
            .checked_add(amount)
            .ok_or(ChainError::BalanceOverflow { account })?;
        let supply = self
            .world
            .total_supply
            .checked_add(amount)
            .ok_or(ChainError::BalanceOverflow { account })?;

        self.world.native.insert(account, balance);
        self.world.total_supply = supply;
        Ok(())
    }

    /// Deploy an asset contract at `address`.
    pub fn deploy_nft<C>(&mut self, address: Address, contract: C) -> Result<(), ChainError>
    where
        C: NftContract + 'static,
    {
        if address.is_zero()
            || address == self.config.escrow_address
            || self.world.nfts.contains_key(&address)
            || self.executing.contains(&address)
        {
            return Err(ChainError::Reverted {
                account: address,
                reason: "address already in use".to_string(),
            });
        }

        debug!(contract = %address, "Asset contract deployed");
        self.world.nfts.insert(address, Box::new(contract));
        Ok(())
    }

    /// Attach code to `account`, replacing any code already there.
    pub fn set_receiver<R>(&mut self, account: Address, code: R)
    where
        R: Receiver + 'static,
    {
        self.world.receivers.insert(account, Box::new(code));
    }

    // ─── Escrow entry points ───

    /// Payable: `value` moves from `caller` to the escrow first.
    pub fn initiate_swap(
        &mut self,
        caller: Address,
        value: Wei,
        terms: SwapTerms,
    ) -> Result<SwapId, SwapError> {
        self.entry("initiate_swap", caller, |chain| {
            chain.pay_escrow(caller, value)?;
            escrow::initiate_swap(chain, &CallContext::new(caller, value), terms)
        })
    }

    /// Payable: `value` moves from `caller` to the escrow first.
    pub fn complete_swap(
        &mut self,
        caller: Address,
        value: Wei,
        swap_id: SwapId,
        terms: &SwapTerms,
    ) -> Result<(), SwapError> {
        self.entry("complete_swap", caller, |chain| {
            chain.pay_escrow(caller, value)?;
            escrow::complete_swap(chain, &CallContext::new(caller, value), swap_id, terms)
        })
    }

    pub fn remove_swap(
        &mut self,
        caller: Address,
        swap_id: SwapId,
        terms: &SwapTerms,
    ) -> Result<(), SwapError> {
        self.entry("remove_swap", caller, |chain| {
            escrow::remove_swap(chain, &CallContext::unpaid(caller), swap_id, terms)
        })
    }

    /// Pay out the caller's ledger balance. Returns the amount sent.
    pub fn withdraw(&mut self, caller: Address) -> Result<Wei, SwapError> {
        self.entry("withdraw", caller, |chain| {
            withdrawal::withdraw(chain, &CallContext::unpaid(caller))
        })
    }

    pub fn get_swap_status(
        &self,
        swap_id: SwapId,
        terms: &SwapTerms,
    ) -> Result<SwapStatus, SwapError> {
        escrow::get_swap_status(self, swap_id, terms)
    }

    // ─── Account operations ───

    /// Plain value transfer between accounts, running the recipient's code.
    pub fn transfer(&mut self, caller: Address, to: Address, amount: Wei) -> Result<(), ChainError> {
        self.send(caller, to, amount)
    }

    /// Approve `approved` for `token_id`, or clear the approval with `None`.
    pub fn approve(
        &mut self,
        caller: Address,
        contract: Address,
        approved: Option<Address>,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        self.call_nft(contract, |nft, _| nft.approve(caller, approved, token_id))
    }

    pub fn set_approval_for_all(
        &mut self,
        caller: Address,
        contract: Address,
        operator: Address,
        approved: bool,
    ) -> Result<(), AssetError> {
        self.call_nft(contract, |nft, _| {
            nft.set_approval_for_all(caller, operator, approved)
        })
    }

    /// Move a token with `caller` as operator.
    pub fn safe_transfer_from(
        &mut self,
        caller: Address,
        contract: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let transfer = NftTransfer {
            contract,
            operator: caller,
            from,
            to,
            token_id,
        };
        self.call_nft(contract, |nft, chain| nft.safe_transfer_from(chain, &transfer))
    }

    /// Run the recipient's token hook. Called by asset contracts after a
    /// transfer; a rejection reverts the transfer.
    pub fn notify_nft_received(&mut self, transfer: &NftTransfer) -> Result<(), AssetError> {
        let to = transfer.to;
        self.run_receiver(to, |code, chain| code.on_nft_received(chain, to, transfer))
            .map_err(|e| {
                debug!(receiver = %to, token_id = transfer.token_id, error = %e, "Token rejected");
                AssetError::ReceiverRejected {
                    receiver: to,
                    token_id: transfer.token_id,
                }
            })
    }

    // ─── Read surface ───

    pub fn escrow_address(&self) -> Address {
        self.config.escrow_address
    }

    /// Withdrawable ledger balance of `account`.
    pub fn balance_of(&self, account: &Address) -> Wei {
        self.world.storage.ledger.balance_of(account)
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.world.storage.ledger
    }

    /// Stored digest for an open swap.
    pub fn commitment_of(&self, swap_id: SwapId) -> Option<TermsHash> {
        self.world.storage.commitments.digest(swap_id)
    }

    pub fn next_swap_id(&self) -> SwapId {
        self.world.storage.commitments.next_swap_id()
    }

    pub fn native_balance(&self, account: &Address) -> Wei {
        self.world.native.get(account).copied().unwrap_or(0)
    }

    /// All native value ever minted.
    pub fn total_supply(&self) -> Wei {
        self.world.total_supply
    }

    pub fn token_owner(&self, contract: Address, token_id: TokenId) -> Result<Address, AssetError> {
        self.nft(contract)?.owner_of(token_id)
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.world.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.world.events)
    }

    /// Current frame nesting.
    pub fn depth(&self) -> usize {
        self.depth
    }

    // ─── Frames ───

    fn frame<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<ChainError>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        if self.depth >= self.config.max_call_depth {
            return Err(ChainError::CallDepthExceeded {
                limit: self.config.max_call_depth,
            }
            .into());
        }

        let snapshot = self.world.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            debug!(depth = self.depth, "Frame reverted");
            self.world = snapshot;
        }
        result
    }

    fn entry<T, F>(&mut self, op: &'static str, caller: Address, f: F) -> Result<T, SwapError>
    where
        F: FnOnce(&mut Self) -> Result<T, SwapError>,
    {
        let top_level = self.depth == 0;
        debug!(op, caller = %caller, depth = self.depth, "Entering escrow");

        let result = self.frame(f);
        if let Err(e) = &result {
            if top_level {
                warn!(op, caller = %caller, error = %e, "Call reverted");
            } else {
                debug!(op, caller = %caller, error = %e, "Reentrant call reverted");
            }
        }
        result
    }

    fn pay_escrow(&mut self, caller: Address, value: Wei) -> Result<(), ChainError> {
        let escrow = self.config.escrow_address;
        self.move_native(caller, escrow, value)
    }

    fn move_native(&mut self, from: Address, to: Address, amount: Wei) -> Result<(), ChainError> {
        if amount == 0 {
            return Ok(());
        }
        let available = self.native_balance(&from);
        if available < amount {
            return Err(ChainError::InsufficientFunds {
                account: from,
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .native_balance(&to)
            .checked_add(amount)
            .ok_or(ChainError::BalanceOverflow { account: to })?;

        self.world.native.insert(from, available - amount);
        self.world.native.insert(to, credited);
        Ok(())
    }

    /// Value transfer in its own frame, followed by the recipient's hook.
    fn send(&mut self, from: Address, to: Address, amount: Wei) -> Result<(), ChainError> {
        self.frame(|chain| {
            chain.move_native(from, to, amount)?;
            chain.run_receiver(to, |code, chain| {
                code.on_value_received(chain, to, from, amount)
            })
        })
    }

    fn run_receiver<F>(&mut self, account: Address, f: F) -> Result<(), ChainError>
    where
        F: FnOnce(&mut dyn Receiver, &mut Chain) -> Result<(), ChainError>,
    {
        let Some(mut code) = self.world.receivers.remove(&account) else {
            if self.executing.contains(&account) {
                return Err(ChainError::Reverted {
                    account,
                    reason: "account code already executing".to_string(),
                });
            }
            return Ok(());
        };

        self.executing.insert(account);
        let result = f(code.as_mut(), self);
        self.executing.remove(&account);
        self.world.receivers.insert(account, code);
        result
    }

    fn nft(&self, contract: Address) -> Result<&dyn NftContract, AssetError> {
        match self.world.nfts.get(&contract) {
            Some(code) => Ok(code.as_ref()),
            None => Err(self.missing_contract(contract)),
        }
    }

    fn missing_contract(&self, contract: Address) -> AssetError {
        if self.executing.contains(&contract) {
            ChainError::Reverted {
                account: contract,
                reason: "contract already executing".to_string(),
            }
            .into()
        } else {
            AssetError::UnknownContract { contract }
        }
    }

    /// Run `f` against a deployed contract in its own frame.
    fn call_nft<T, F>(&mut self, contract: Address, f: F) -> Result<T, AssetError>
    where
        F: FnOnce(&mut dyn NftContract, &mut Chain) -> Result<T, AssetError>,
    {
        self.frame(|chain| {
            let Some(mut code) = chain.world.nfts.remove(&contract) else {
                return Err(chain.missing_contract(contract));
            };

            chain.executing.insert(contract);
            let result = f(code.as_mut(), chain);
            chain.executing.remove(&contract);
            chain.world.nfts.insert(contract, code);
            result
        })
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

impl Host for Chain {
    fn escrow_address(&self) -> Address {
        self.config.escrow_address
    }

    fn storage(&self) -> &EscrowStorage {
        &self.world.storage
    }

    fn storage_mut(&mut self) -> &mut EscrowStorage {
        &mut self.world.storage
    }

    fn emit(&mut self, event: ContractEvent) {
        debug!(event = event.label(), "Event emitted");
        self.world.events.push(event);
    }

    fn nft_safe_transfer_from(
        &mut self,
        contract: Address,
        from: Address,
        to: Address,
        token_id: TokenId,
    ) -> Result<(), AssetError> {
        let escrow = self.config.escrow_address;
        self.safe_transfer_from(escrow, contract, from, to, token_id)
    }

    fn nft_owner_of(&self, contract: Address, token_id: TokenId) -> Result<Address, AssetError> {
        self.token_owner(contract, token_id)
    }

    fn nft_get_approved(
        &self,
        contract: Address,
        token_id: TokenId,
    ) -> Result<Option<Address>, AssetError> {
        self.nft(contract)?.get_approved(token_id)
    }

    fn nft_is_approved_for_all(
        &self,
        contract: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool, AssetError> {
        Ok(self.nft(contract)?.is_approved_for_all(owner, operator))
    }

    fn send_value(&mut self, to: Address, amount: Wei) -> Result<(), ChainError> {
        let escrow = self.config.escrow_address;
        self.send(escrow, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nft::StandardNft;

    fn acc(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    #[derive(Debug, Clone)]
    struct Rejecting;

    impl Receiver for Rejecting {
        fn on_value_received(
            &mut self,
            _chain: &mut Chain,
            account: Address,
            _from: Address,
            _amount: Wei,
        ) -> Result<(), ChainError> {
            Err(ChainError::Reverted {
                account,
                reason: "no receive".to_string(),
            })
        }

        fn on_nft_received(
            &mut self,
            _chain: &mut Chain,
            account: Address,
            _transfer: &NftTransfer,
        ) -> Result<(), ChainError> {
            Err(ChainError::Reverted {
                account,
                reason: "no tokens".to_string(),
            })
        }

        fn box_clone(&self) -> Box<dyn Receiver> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_new_chain_prefunds_escrow() {
        let chain = Chain::new(ChainConfig {
            initial_escrow_funding: 100,
            ..Default::default()
        });
        assert_eq!(chain.native_balance(&chain.escrow_address()), 100);
        assert_eq!(chain.total_supply(), 100);
        assert_eq!(chain.ledger().total_outstanding(), 0);
        assert_eq!(chain.next_swap_id(), SwapId::FIRST);
    }

    #[test]
    fn test_fund_and_transfer() {
        let mut chain = Chain::default();
        chain.fund(acc(1), 10).unwrap();
        chain.transfer(acc(1), acc(2), 4).unwrap();

        assert_eq!(chain.native_balance(&acc(1)), 6);
        assert_eq!(chain.native_balance(&acc(2)), 4);
        assert_eq!(chain.total_supply(), 10);
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let mut chain = Chain::default();
        chain.fund(acc(1), 3).unwrap();
        let result = chain.transfer(acc(1), acc(2), 4);
        assert_eq!(
            result,
            Err(ChainError::InsufficientFunds {
                account: acc(1),
                required: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn test_fund_overflow() {
        let mut chain = Chain::default();
        chain.fund(acc(1), Wei::MAX).unwrap();
        assert_eq!(
            chain.fund(acc(2), 1),
            Err(ChainError::BalanceOverflow { account: acc(2) })
        );
        assert_eq!(chain.native_balance(&acc(2)), 0);
    }

    #[test]
    fn test_rejected_transfer_reverts_value() {
        let mut chain = Chain::default();
        chain.fund(acc(1), 10).unwrap();
        chain.set_receiver(acc(2), Rejecting);

        assert!(chain.transfer(acc(1), acc(2), 4).is_err());
        assert_eq!(chain.native_balance(&acc(1)), 10);
        assert_eq!(chain.native_balance(&acc(2)), 0);
        assert_eq!(chain.depth(), 0);
    }

    #[test]
    fn test_deploy_rejects_taken_address() {
        let mut chain = Chain::default();
        chain.deploy_nft(acc(0x100), StandardNft::new("A")).unwrap();
        assert!(chain.deploy_nft(acc(0x100), StandardNft::new("B")).is_err());

        let escrow = chain.escrow_address();
        assert!(chain.deploy_nft(escrow, StandardNft::new("C")).is_err());
        assert!(chain.deploy_nft(Address::ZERO, StandardNft::new("D")).is_err());
    }

    #[test]
    fn test_token_passthroughs() {
        let mut chain = Chain::default();
        chain
            .deploy_nft(acc(0x100), StandardNft::new("A").mint(acc(1), 7))
            .unwrap();

        chain.approve(acc(1), acc(0x100), Some(acc(3)), 7).unwrap();
        chain
            .safe_transfer_from(acc(3), acc(0x100), acc(1), acc(2), 7)
            .unwrap();
        assert_eq!(chain.token_owner(acc(0x100), 7), Ok(acc(2)));

        // Approval cleared by the transfer
        let again = chain.safe_transfer_from(acc(3), acc(0x100), acc(2), acc(3), 7);
        assert_eq!(
            again,
            Err(AssetError::NotAuthorized {
                operator: acc(3),
                token_id: 7
            })
        );
    }

    #[test]
    fn test_transfer_to_rejecting_receiver_reverts() {
        let mut chain = Chain::default();
        chain
            .deploy_nft(acc(0x100), StandardNft::new("A").mint(acc(1), 7))
            .unwrap();
        chain.set_receiver(acc(2), Rejecting);

        let result = chain.safe_transfer_from(acc(1), acc(0x100), acc(1), acc(2), 7);
        assert_eq!(
            result,
            Err(AssetError::ReceiverRejected {
                receiver: acc(2),
                token_id: 7
            })
        );
        assert_eq!(chain.token_owner(acc(0x100), 7), Ok(acc(1)));
    }

    #[test]
    fn test_unknown_contract() {
        let chain = Chain::default();
        assert_eq!(
            chain.token_owner(acc(0x999), 1),
            Err(AssetError::UnknownContract {
                contract: acc(0x999)
            })
        );
    }

    #[test]
    fn test_drain_events() {
        let mut chain = Chain::default();
        chain.emit(ContractEvent::BalanceWithdrawn(
            crate::events::BalanceWithdrawn {
                account: acc(1),
                amount: 1,
            },
        ));
        assert_eq!(chain.drain_events().len(), 1);
        assert!(chain.events().is_empty());
    }

    #[test]
    fn test_zero_depth_limit_blocks_every_call() {
        let mut chain = Chain::new(ChainConfig {
            max_call_depth: 0,
            ..Default::default()
        });
        chain.fund(acc(1), 1).unwrap();
        assert_eq!(
            chain.transfer(acc(1), acc(2), 1),
            Err(ChainError::CallDepthExceeded { limit: 0 })
        );
    }
}
