use barter_types::models::{Ad, AdId, AdInput, ExchangeProposal, ProposalId, ProposalStatus, UserId};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Validated proposal fields, as submitted for create or edit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProposal {
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    pub comment: String,
}

/// Read access to ads.
pub trait AdRegistry: Send + Sync {
    fn get_ad(&self, id: AdId) -> StoreResult<Option<Ad>>;

    /// Ads owned by `owner`, oldest first.
    fn list_ads_by_owner(&self, owner: UserId) -> StoreResult<Vec<Ad>>;
}

/// Full ad persistence, used by the registry service.
pub trait AdStore: AdRegistry {
    fn insert_ad(&self, owner: UserId, input: &AdInput) -> StoreResult<Ad>;

    fn update_ad(&self, id: AdId, input: &AdInput) -> StoreResult<()>;

    /// Removes the ad and every proposal that references it.
    fn delete_ad(&self, id: AdId) -> StoreResult<bool>;

    /// Newest first.
    fn list_ads(&self, limit: u32, offset: u32) -> StoreResult<Vec<Ad>>;
}

pub trait ProposalStore: Send + Sync {
    fn get_proposal(&self, id: ProposalId) -> StoreResult<Option<ExchangeProposal>>;

    /// The non-rejected proposal linking `a` and `b` in either direction,
    /// ignoring `excluding` when given.
    fn find_active_between(
        &self,
        a: AdId,
        b: AdId,
        excluding: Option<ProposalId>,
    ) -> StoreResult<Option<ExchangeProposal>>;

    /// Inserts with status `waiting`. Fails with [`StoreError::Conflict`]
    /// when another active proposal holds the pair.
    fn insert_proposal(&self, new: &NewProposal) -> StoreResult<ExchangeProposal>;

    /// Writes sender, receiver, comment and status, but only while the stored
    /// status is still `expected`; otherwise fails with [`StoreError::Stale`]
    /// and writes nothing. Same conflict rule as insert.
    fn update_proposal(
        &self,
        proposal: &ExchangeProposal,
        expected: ProposalStatus,
    ) -> StoreResult<()>;

    fn delete_proposal(&self, id: ProposalId) -> StoreResult<bool>;

    /// Proposals where `user` owns the sender or receiver ad, newest first.
    fn list_for_user(&self, user: UserId) -> StoreResult<Vec<ExchangeProposal>>;
}
