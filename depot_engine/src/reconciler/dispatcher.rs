use depot_common::Gold;
use log::*;

use super::{DepositMatch, IdentityError, IdentityResolver, ResolvedParties};
use crate::{
    events::{DepositCreditedEvent, DepositFailedEvent, EventProducers},
    traits::{DepositNotifier, IdentityDirectory, LedgerError, LedgerManagement},
    LedgerApi,
};

pub const DEPOSIT_TITLE: &str = "Deposit";

/// What became of a matched deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Credited { receiver_identity: String, new_balance: Gold },
    IdentityFailed(IdentityError),
    LedgerFailed(LedgerError),
}

impl DispatchOutcome {
    pub fn is_credited(&self) -> bool {
        matches!(self, DispatchOutcome::Credited { .. })
    }
}

/// Resolves, announces and credits matched deposits.
pub struct DepositDispatcher<B, N> {
    ledger: LedgerApi<B>,
    notifier: N,
    producers: EventProducers,
}

impl<B, N> DepositDispatcher<B, N>
where
    B: LedgerManagement,
    N: DepositNotifier,
{
    pub fn new(ledger: LedgerApi<B>, notifier: N, producers: EventProducers) -> Self {
        Self { ledger, notifier, producers }
    }

    pub fn ledger(&self) -> &LedgerApi<B> {
        &self.ledger
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Notifies the depositor, then the receiver, then credits the receiver's account and writes the audit line.
    ///
    /// Undeliverable notices do not hold up the credit. If either party cannot be resolved, or the ledger rejects the
    /// credit, a failure notice goes to the log channel instead and no balance changes. Nothing is retried.
    pub async fn dispatch<D: IdentityDirectory>(&self, directory: &D, deposit: &DepositMatch) -> DispatchOutcome {
        let parties = match IdentityResolver::new(directory).resolve(&deposit.depositor, &deposit.receiver).await {
            Ok(p) => p,
            Err(e) => {
                warn!("🔎️ Could not resolve the parties of {deposit:?}: {e}");
                self.fail(deposit, e.to_string()).await;
                return DispatchOutcome::IdentityFailed(e);
            },
        };
        self.announce(deposit, &parties).await;
        match self.ledger.adjust(&parties.receiver_identity, deposit.amount).await {
            Ok(new_balance) => {
                info!(
                    "🏦️ Credited {} to {} ({}) for a deposit by {}",
                    deposit.amount, deposit.receiver, parties.receiver_identity, deposit.depositor
                );
                let line = format!(
                    "✅ Deposited **{}** from {} into {}'s account.",
                    deposit.amount, deposit.depositor, deposit.receiver
                );
                self.log_line(&line).await;
                let event = DepositCreditedEvent {
                    depositor: deposit.depositor.clone(),
                    receiver: deposit.receiver.clone(),
                    receiver_identity: parties.receiver_identity.clone(),
                    amount: deposit.amount,
                    new_balance,
                };
                self.producers.publish_credited(event).await;
                DispatchOutcome::Credited { receiver_identity: parties.receiver_identity, new_balance }
            },
            Err(e) => {
                error!("🏦️ Could not credit {} to {}: {e}", deposit.amount, parties.receiver_identity);
                self.fail(deposit, e.to_string()).await;
                DispatchOutcome::LedgerFailed(e)
            },
        }
    }

    async fn announce(&self, deposit: &DepositMatch, parties: &ResolvedParties) {
        let to_depositor = format!("✅ Deposited **{}** with {}.", deposit.amount, deposit.receiver);
        if let Err(e) = self.notifier.notify_user(&parties.depositor_identity, DEPOSIT_TITLE, &to_depositor).await {
            warn!("🔔️ Could not notify {} of their deposit: {e}", deposit.depositor);
        }
        let to_receiver = format!("✅ Received a deposit of **{}** from {}.", deposit.amount, deposit.depositor);
        if let Err(e) = self.notifier.notify_user(&parties.receiver_identity, DEPOSIT_TITLE, &to_receiver).await {
            warn!("🔔️ Could not notify {} of the deposit: {e}", deposit.receiver);
        }
    }

    async fn fail(&self, deposit: &DepositMatch, reason: String) {
        let line = format!(
            "❌ Failed to deposit **{}** from {} into {}'s account.",
            deposit.amount, deposit.depositor, deposit.receiver
        );
        error!("🔔️ {line} {reason}");
        self.log_line(&line).await;
        let event = DepositFailedEvent {
            depositor: deposit.depositor.clone(),
            receiver: deposit.receiver.clone(),
            amount: deposit.amount,
            reason,
        };
        self.producers.publish_failed(event).await;
    }

    async fn log_line(&self, line: &str) {
        if let Err(e) = self.notifier.post_log(line).await {
            warn!("🔔️ Could not post to the log channel: {e}");
        }
    }
}
