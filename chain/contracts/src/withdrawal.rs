//! Withdrawal — pull payment of ledger balances
//!
//! The caller's whole balance is zeroed and the event emitted before any
//! value leaves the escrow. Recipient code that re-enters `withdraw`
//! finds an empty balance and fails with `EmptyWithdraw`.

use swap_types::ids::Wei;
use tracing::{info, warn};

use crate::errors::{LedgerError, SwapError};
use crate::events::{BalanceWithdrawn, ContractEvent};
use crate::host::{CallContext, Host};

/// Pay out the caller's entire ledger balance and return the amount sent.
///
/// A failed send surfaces as `EthSendFailed`; the caller's frame is then
/// reverted and the balance restored.
pub fn withdraw<H: Host + ?Sized>(host: &mut H, msg: &CallContext) -> Result<Wei, SwapError> {
    let account = msg.caller;
    let amount = host.storage_mut().ledger.take(&account)?;

    host.emit(ContractEvent::BalanceWithdrawn(BalanceWithdrawn {
        account,
        amount,
    }));

    if let Err(e) = host.send_value(account, amount) {
        warn!(account = %account, amount, error = %e, "Withdrawal send failed");
        return Err(LedgerError::EthSendFailed { account, amount }.into());
    }

    info!(account = %account, amount, "Balance withdrawn");
    Ok(amount)
}
