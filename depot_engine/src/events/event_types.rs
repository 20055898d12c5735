use depot_common::Gold;
use serde::{Deserialize, Serialize};

/// Published after a reconciled deposit has been credited to the receiver's ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCreditedEvent {
    pub depositor: String,
    pub receiver: String,
    pub receiver_identity: String,
    pub amount: Gold,
    pub new_balance: Gold,
}

/// Published when a matched deposit could not be credited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositFailedEvent {
    pub depositor: String,
    pub receiver: String,
    pub amount: Gold,
    pub reason: String,
}
