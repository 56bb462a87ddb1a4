use std::sync::Arc;

use tracing::{debug, info, warn};

use barter_types::models::{Ad, AdId, ExchangeProposal, ProposalAction, ProposalId, ProposalStatus, UserId};

use crate::access::{self, Parties};
use crate::error::{ExchangeError, ExchangeResult, Field, StoreError};
use crate::state::{self, TransitionPolicy};
use crate::store::{AdRegistry, NewProposal, ProposalStore};

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_LEN: usize = 500;

/// A proposal together with the two ads it links.
#[derive(Debug, Clone)]
pub struct ProposalDetail {
    pub proposal: ExchangeProposal,
    pub sender_ad: Ad,
    pub receiver_ad: Ad,
}

impl ProposalDetail {
    pub fn parties(&self) -> Parties {
        Parties::of(&self.sender_ad, &self.receiver_ad)
    }
}

pub struct ExchangeEngine<S> {
    store: Arc<S>,
    policy: TransitionPolicy,
}

impl<S> Clone for ExchangeEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            policy: self.policy,
        }
    }
}

impl<S> ExchangeEngine<S>
where
    S: AdRegistry + ProposalStore,
{
    pub fn new(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Validates and stores a new proposal from `user` with status `waiting`.
    pub fn create(&self, user: UserId, new: NewProposal) -> ExchangeResult<ExchangeProposal> {
        let new = self.validate(user, new, None)?;

        let proposal = match self.store.insert_proposal(&new) {
            Ok(p) => p,
            Err(StoreError::Conflict) => {
                return Err(self.conflict(new.ad_sender, new.ad_receiver, None));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Proposal #{} created: ad #{} -> ad #{} by {}",
            proposal.id, proposal.ad_sender, proposal.ad_receiver, user
        );
        Ok(proposal)
    }

    /// Runs a receiver action (accept, reject, recreate) against a proposal.
    pub fn apply_action(
        &self,
        id: ProposalId,
        action: ProposalAction,
        user: UserId,
    ) -> ExchangeResult<ExchangeProposal> {
        let detail = self.load(id)?;
        if !access::is_receiver(user, &detail.parties()) {
            warn!("User {} may not {} proposal #{}", user, action, id);
            return Err(ExchangeError::Forbidden);
        }

        let mut proposal = detail.proposal;
        let from = proposal.status;
        let next = state::transition(from, action, self.policy)?;

        if next.swap {
            std::mem::swap(&mut proposal.ad_sender, &mut proposal.ad_receiver);
        }

        // Reopening a rejected proposal claims the pair again.
        if next.status.is_active() && !from.is_active() {
            if let Some(existing) =
                self.store
                    .find_active_between(proposal.ad_sender, proposal.ad_receiver, Some(id))?
            {
                return Err(ExchangeError::Duplicate {
                    existing: existing.id,
                    status: existing.status,
                });
            }
        }

        proposal.status = next.status;
        self.save(&proposal, from)?;

        info!("Proposal #{} {}: {} -> {}", id, action, from, proposal.status);
        Ok(proposal)
    }

    /// Replaces sender, receiver and comment. Sender only, while `waiting`.
    pub fn edit(
        &self,
        id: ProposalId,
        user: UserId,
        new: NewProposal,
    ) -> ExchangeResult<ExchangeProposal> {
        let detail = self.load(id)?;
        access::require(access::is_sender(user, &detail.parties()))?;

        let mut proposal = detail.proposal;
        if proposal.status != ProposalStatus::Waiting {
            return Err(ExchangeError::NotEditable(proposal.status));
        }

        let new = self.validate(user, new, Some(id))?;
        proposal.ad_sender = new.ad_sender;
        proposal.ad_receiver = new.ad_receiver;
        proposal.comment = new.comment;
        self.save(&proposal, ProposalStatus::Waiting)?;

        info!("Proposal #{} edited by {}", id, user);
        Ok(proposal)
    }

    /// Removes a proposal. Sender only, in any status.
    pub fn delete(&self, id: ProposalId, user: UserId) -> ExchangeResult<()> {
        let detail = self.load(id)?;
        if !access::is_sender(user, &detail.parties()) {
            warn!("User {} may not delete proposal #{}", user, id);
            return Err(ExchangeError::Forbidden);
        }

        if !self.store.delete_proposal(id)? {
            return Err(ExchangeError::ProposalNotFound(id));
        }
        info!("Proposal #{} deleted by {}", id, user);
        Ok(())
    }

    pub fn list_for(&self, user: UserId) -> ExchangeResult<Vec<ExchangeProposal>> {
        Ok(self.store.list_for_user(user)?)
    }

    /// Reads a proposal. Either party may view it.
    pub fn get(&self, id: ProposalId, user: UserId) -> ExchangeResult<ProposalDetail> {
        let detail = self.load(id)?;
        access::require(access::is_participant(user, &detail.parties()))?;
        Ok(detail)
    }

    fn load(&self, id: ProposalId) -> ExchangeResult<ProposalDetail> {
        let proposal = self
            .store
            .get_proposal(id)?
            .ok_or(ExchangeError::ProposalNotFound(id))?;
        let sender_ad = self.resolve(proposal.ad_sender, Field::AdSender)?;
        let receiver_ad = self.resolve(proposal.ad_receiver, Field::AdReceiver)?;

        Ok(ProposalDetail {
            proposal,
            sender_ad,
            receiver_ad,
        })
    }

    fn resolve(&self, id: AdId, field: Field) -> ExchangeResult<Ad> {
        self.store
            .get_ad(id)?
            .ok_or(ExchangeError::AdNotFound { field, id })
    }

    /// Checks run in a fixed order: both ads exist, ownership, then duplicates.
    fn validate(
        &self,
        user: UserId,
        new: NewProposal,
        editing: Option<ProposalId>,
    ) -> ExchangeResult<NewProposal> {
        let sender = self.resolve(new.ad_sender, Field::AdSender)?;
        let receiver = self.resolve(new.ad_receiver, Field::AdReceiver)?;

        if sender.owner != user {
            let owned: Vec<AdId> = self
                .store
                .list_ads_by_owner(user)?
                .into_iter()
                .map(|ad| ad.id)
                .collect();
            if !owned.is_empty() {
                return Err(ExchangeError::NotOwner { owned_ads: owned });
            }
            // Nothing to suggest, so the foreign sender ad is let through.
            debug!("User {} owns no ads; accepting ad #{} as sender", user, sender.id);
        }

        if receiver.owner == user {
            return Err(ExchangeError::SelfExchange(receiver.id));
        }
        if sender.id == receiver.id {
            return Err(ExchangeError::SameAd);
        }
        // Reachable only through the zero-ads waiver: both ads share an owner.
        if sender.owner == receiver.owner {
            return Err(ExchangeError::SelfExchange(receiver.id));
        }

        check_comment(&new.comment)?;

        if let Some(existing) = self
            .store
            .find_active_between(sender.id, receiver.id, editing)?
        {
            warn!(
                "Duplicate proposal for ads #{}/#{}: #{} is {}",
                sender.id, receiver.id, existing.id, existing.status
            );
            return Err(ExchangeError::Duplicate {
                existing: existing.id,
                status: existing.status,
            });
        }

        Ok(new)
    }

    /// Writes `proposal` only if its stored status is still `expected`.
    fn save(&self, proposal: &ExchangeProposal, expected: ProposalStatus) -> ExchangeResult<()> {
        match self.store.update_proposal(proposal, expected) {
            Ok(()) => Ok(()),
            Err(StoreError::Stale) => Err(self.stale(proposal.id)),
            Err(StoreError::Conflict) => Err(self.conflict(
                proposal.ad_sender,
                proposal.ad_receiver,
                Some(proposal.id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn stale(&self, id: ProposalId) -> ExchangeError {
        match self.store.get_proposal(id) {
            Ok(Some(current)) => {
                warn!("Proposal #{} changed concurrently; now {}", id, current.status);
                ExchangeError::Stale {
                    id,
                    status: current.status,
                }
            }
            Ok(None) => ExchangeError::ProposalNotFound(id),
            Err(e) => e.into(),
        }
    }

    /// Maps a storage uniqueness conflict to the proposal that won the race.
    fn conflict(&self, a: AdId, b: AdId, excluding: Option<ProposalId>) -> ExchangeError {
        match self.store.find_active_between(a, b, excluding) {
            Ok(Some(existing)) => ExchangeError::Duplicate {
                existing: existing.id,
                status: existing.status,
            },
            Ok(None) => ExchangeError::Store(StoreError::Conflict),
            Err(e) => e.into(),
        }
    }
}

fn check_comment(comment: &str) -> ExchangeResult<()> {
    if comment.trim().is_empty() {
        return Err(ExchangeError::InvalidComment("comment is required"));
    }
    if comment.chars().count() > MAX_COMMENT_LEN {
        return Err(ExchangeError::InvalidComment("comment is longer than 500 characters"));
    }
    Ok(())
}
