//! The ledger surface used by chat commands and by the deposit reconciler.

use std::fmt::Debug;

use depot_common::Gold;
use log::*;

use crate::{
    db_types::LedgerAccount,
    traits::{LedgerError, LedgerManagement},
};

/// `LedgerApi` wraps a [`LedgerManagement`] backend with logging and the argument checks that the raw backend leaves
/// to its callers.
#[derive(Clone)]
pub struct LedgerApi<B> {
    db: B,
}

impl<B: Debug> Debug for LedgerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LedgerApi ({:?})", self.db)
    }
}

impl<B> LedgerApi<B>
where B: LedgerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The balance for `identity`. Unknown identities get a fresh account with a zero balance.
    pub async fn balance(&self, identity: &str) -> Result<Gold, LedgerError> {
        self.db.fetch_balance(identity).await
    }

    pub async fn account(&self, identity: &str) -> Result<Option<LedgerAccount>, LedgerError> {
        self.db.fetch_account(identity).await
    }

    pub async fn reserve_balance(&self) -> Result<Gold, LedgerError> {
        self.db.fetch_reserve_balance().await
    }

    /// Unconditionally adds `delta` to the balance of `identity`. Used for administrative adjustments and for
    /// crediting reconciled deposits.
    pub async fn adjust(&self, identity: &str, delta: Gold) -> Result<Gold, LedgerError> {
        let balance = self.db.adjust_balance(identity, delta).await?;
        debug!("🏦️ Balance of {identity} adjusted by {delta} to {balance}");
        Ok(balance)
    }

    /// Moves funds between two accounts. The amount is not validated; see [`Self::pay`] for the checked variant.
    pub async fn transfer(&self, from: &str, to: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        let balances = self.db.transfer(from, to, amount).await?;
        debug!("🏦️ {amount} transferred from {from} to {to}");
        Ok(balances)
    }

    /// A user-initiated payment. Rejects non-positive amounts and payments to oneself before moving any funds.
    pub async fn pay(&self, from: &str, to: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.transfer(from, to, amount).await
    }

    /// Moves funds between `identity` and the reserve. Positive amounts are paid out of the reserve, negative amounts
    /// are paid into it.
    pub async fn reserve_transfer(&self, identity: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        let balances = self.db.reserve_transfer(identity, amount).await?;
        debug!("🏦️ Reserve transfer of {amount} for {identity}. Reserve now holds {}", balances.1);
        Ok(balances)
    }

    /// Pays a reward out of the reserve.
    pub async fn reward(&self, identity: &str, amount: Gold) -> Result<(Gold, Gold), LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(amount));
        }
        self.reserve_transfer(identity, amount).await
    }
}
