use log::*;
use thiserror::Error;

use crate::traits::{IdentityDirectory, WorldFeedError};

/// Which of the two chained lookups failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStage {
    StableId,
    LinkedIdentity,
}

impl std::fmt::Display for LookupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStage::StableId => write!(f, "account id"),
            LookupStage::LinkedIdentity => write!(f, "linked account"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Identity lookup failed: {0}")]
    LookupFailed(#[from] WorldFeedError),
    #[error("Expected exactly one {stage} for {name}, but found {found}")]
    Unresolved { name: String, stage: LookupStage, found: usize },
}

/// Platform identities for both sides of a matched deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParties {
    pub depositor_identity: String,
    pub receiver_identity: String,
}

/// Maps game-world names to platform identities: name → stable id → linked identity.
pub struct IdentityResolver<'a, D> {
    directory: &'a D,
}

impl<'a, D: IdentityDirectory> IdentityResolver<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    /// Resolves both parties in one request per stage. Each party must resolve to exactly one stable id and exactly
    /// one linked identity, otherwise nothing is returned for either of them.
    pub async fn resolve(&self, depositor: &str, receiver: &str) -> Result<ResolvedParties, IdentityError> {
        let names = vec![depositor.to_string(), receiver.to_string()];
        let stable_ids = self.directory.stable_ids(&names).await?;
        let depositor_id = single(depositor, LookupStage::StableId, stable_ids.iter().filter(|s| s.name == depositor))?;
        let receiver_id = single(receiver, LookupStage::StableId, stable_ids.iter().filter(|s| s.name == receiver))?;
        trace!("🔎️ {depositor} is {} and {receiver} is {}", depositor_id.id, receiver_id.id);

        let ids = vec![depositor_id.id.clone(), receiver_id.id.clone()];
        let links = self.directory.linked_identities(&ids).await?;
        let depositor_link =
            single(depositor, LookupStage::LinkedIdentity, links.iter().filter(|l| l.stable_id == depositor_id.id))?;
        let receiver_link =
            single(receiver, LookupStage::LinkedIdentity, links.iter().filter(|l| l.stable_id == receiver_id.id))?;
        Ok(ResolvedParties {
            depositor_identity: depositor_link.platform_id.clone(),
            receiver_identity: receiver_link.platform_id.clone(),
        })
    }
}

fn single<'b, T, I>(name: &str, stage: LookupStage, mut results: I) -> Result<&'b T, IdentityError>
where I: Iterator<Item = &'b T> {
    match (results.next(), results.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(IdentityError::Unresolved { name: name.to_string(), stage, found: 0 }),
        (Some(_), Some(_)) => {
            Err(IdentityError::Unresolved { name: name.to_string(), stage, found: 2 + results.count() })
        },
    }
}
