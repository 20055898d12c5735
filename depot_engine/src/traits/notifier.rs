use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifierError {
    #[error("Recipient {0} could not be reached")]
    UnreachableRecipient(String),
    #[error("Could not deliver the message: {0}")]
    DeliveryFailed(String),
}

/// Delivers deposit notices to users and to the operators' log channel.
#[allow(async_fn_in_trait)]
pub trait DepositNotifier {
    /// Sends a private notice to the platform identity `user`.
    async fn notify_user(&self, user: &str, title: &str, message: &str) -> Result<(), NotifierError>;

    /// Posts a line to the operational log channel.
    async fn post_log(&self, message: &str) -> Result<(), NotifierError>;
}
