//! Balance Ledger — withdrawable native value per account
//!
//! Credited only by swap completion and cancellation, drained only by a
//! pull withdrawal that empties the whole balance:
//! - Checked arithmetic on every credit
//! - `take` zeroes the balance before the caller sends anything
//! - An outstanding total backs the conservation invariant

use std::collections::BTreeMap;
use swap_types::ids::{Address, Wei};

use crate::errors::LedgerError;

/// Per-account withdrawable balances.
///
/// Invariant: `sum(balances) == total_outstanding`.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    /// Balances: account -> withdrawable amount (zero entries are dropped)
    balances: BTreeMap<Address, Wei>,
    /// Sum of all balances
    total_outstanding: Wei,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the account's balance. Crediting zero is a no-op.
    pub fn credit(&mut self, account: Address, amount: Wei) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.balance_of(&account);
        let new_balance = current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account })?;
        let new_total = self
            .total_outstanding
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account })?;

        self.balances.insert(account, new_balance);
        self.total_outstanding = new_total;
        Ok(())
    }

    /// Empty the account's balance and return what it held.
    ///
    /// Fails with `EmptyWithdraw` when there is nothing to take.
    pub fn take(&mut self, account: &Address) -> Result<Wei, LedgerError> {
        let amount = self.balances.remove(account).unwrap_or(0);
        if amount == 0 {
            return Err(LedgerError::EmptyWithdraw);
        }

        self.total_outstanding -= amount;
        Ok(amount)
    }

    /// Current withdrawable balance of an account.
    pub fn balance_of(&self, account: &Address) -> Wei {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all outstanding balances.
    pub fn total_outstanding(&self) -> Wei {
        self.total_outstanding
    }

    /// Accounts with a non-zero balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Wei)> {
        self.balances.iter()
    }
}
