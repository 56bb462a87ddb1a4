//! In-memory store, for tests and local experiments.
//!
//! Enforces the same active-pair uniqueness rule as the SQLite schema, under
//! a single lock, so check-and-write is atomic here too.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::Utc;

use barter_types::models::{
    Ad, AdId, AdInput, ExchangeProposal, ProposalId, ProposalStatus, UserId,
};

use crate::error::StoreError;
use crate::store::{AdRegistry, AdStore, NewProposal, ProposalStore, StoreResult};

#[derive(Default)]
struct Inner {
    ads: BTreeMap<AdId, Ad>,
    proposals: BTreeMap<ProposalId, ExchangeProposal>,
    next_ad: AdId,
    next_proposal: ProposalId,
}

impl Inner {
    fn pair_taken(&self, a: AdId, b: AdId, excluding: Option<ProposalId>) -> Option<&ExchangeProposal> {
        self.proposals
            .values()
            .find(|p| Some(p.id) != excluding && p.status.is_active() && p.links(a, b))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::Backend(anyhow!("memory store lock poisoned: {}", e)))
    }
}

impl AdRegistry for MemoryStore {
    fn get_ad(&self, id: AdId) -> StoreResult<Option<Ad>> {
        Ok(self.lock()?.ads.get(&id).cloned())
    }

    fn list_ads_by_owner(&self, owner: UserId) -> StoreResult<Vec<Ad>> {
        Ok(self
            .lock()?
            .ads
            .values()
            .filter(|ad| ad.owner == owner)
            .cloned()
            .collect())
    }
}

impl AdStore for MemoryStore {
    fn insert_ad(&self, owner: UserId, input: &AdInput) -> StoreResult<Ad> {
        let mut inner = self.lock()?;
        inner.next_ad += 1;
        let ad = Ad {
            id: inner.next_ad,
            owner,
            title: input.title.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            condition: input.condition.clone(),
            image_url: input.image_url.clone(),
            created_at: Utc::now(),
        };
        inner.ads.insert(ad.id, ad.clone());
        Ok(ad)
    }

    fn update_ad(&self, id: AdId, input: &AdInput) -> StoreResult<()> {
        let mut inner = self.lock()?;
        let ad = inner
            .ads
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(anyhow!("ad #{} vanished", id)))?;
        ad.title = input.title.clone();
        ad.description = input.description.clone();
        ad.category = input.category.clone();
        ad.condition = input.condition.clone();
        ad.image_url = input.image_url.clone();
        Ok(())
    }

    fn delete_ad(&self, id: AdId) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        let removed = inner.ads.remove(&id).is_some();
        if removed {
            inner
                .proposals
                .retain(|_, p| p.ad_sender != id && p.ad_receiver != id);
        }
        Ok(removed)
    }

    fn list_ads(&self, limit: u32, offset: u32) -> StoreResult<Vec<Ad>> {
        Ok(self
            .lock()?
            .ads
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

impl ProposalStore for MemoryStore {
    fn get_proposal(&self, id: ProposalId) -> StoreResult<Option<ExchangeProposal>> {
        Ok(self.lock()?.proposals.get(&id).cloned())
    }

    fn find_active_between(
        &self,
        a: AdId,
        b: AdId,
        excluding: Option<ProposalId>,
    ) -> StoreResult<Option<ExchangeProposal>> {
        Ok(self.lock()?.pair_taken(a, b, excluding).cloned())
    }

    fn insert_proposal(&self, new: &NewProposal) -> StoreResult<ExchangeProposal> {
        let mut inner = self.lock()?;
        if inner.pair_taken(new.ad_sender, new.ad_receiver, None).is_some() {
            return Err(StoreError::Conflict);
        }

        inner.next_proposal += 1;
        let proposal = ExchangeProposal {
            id: inner.next_proposal,
            ad_sender: new.ad_sender,
            ad_receiver: new.ad_receiver,
            comment: new.comment.clone(),
            status: ProposalStatus::Waiting,
            created_at: Utc::now(),
        };
        inner.proposals.insert(proposal.id, proposal.clone());
        Ok(proposal)
    }

    fn update_proposal(
        &self,
        proposal: &ExchangeProposal,
        expected: ProposalStatus,
    ) -> StoreResult<()> {
        let mut inner = self.lock()?;
        match inner.proposals.get(&proposal.id) {
            Some(stored) if stored.status == expected => {}
            _ => return Err(StoreError::Stale),
        }
        if proposal.status.is_active()
            && inner
                .pair_taken(proposal.ad_sender, proposal.ad_receiver, Some(proposal.id))
                .is_some()
        {
            return Err(StoreError::Conflict);
        }

        if let Some(stored) = inner.proposals.get_mut(&proposal.id) {
            // created_at is never rewritten
            stored.ad_sender = proposal.ad_sender;
            stored.ad_receiver = proposal.ad_receiver;
            stored.comment = proposal.comment.clone();
            stored.status = proposal.status;
        }
        Ok(())
    }

    fn delete_proposal(&self, id: ProposalId) -> StoreResult<bool> {
        Ok(self.lock()?.proposals.remove(&id).is_some())
    }

    fn list_for_user(&self, user: UserId) -> StoreResult<Vec<ExchangeProposal>> {
        let inner = self.lock()?;
        let owns = |ad: AdId| inner.ads.get(&ad).is_some_and(|a| a.owner == user);
        Ok(inner
            .proposals
            .values()
            .rev()
            .filter(|p| owns(p.ad_sender) || owns(p.ad_receiver))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn input() -> AdInput {
        AdInput {
            title: "Lamp".into(),
            description: "Desk lamp".into(),
            category: "home".into(),
            condition: "good".into(),
            image_url: None,
        }
    }

    #[test]
    fn insert_conflicts_on_reversed_active_pair() {
        let store = MemoryStore::new();
        let a = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;
        let b = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;

        let first = store
            .insert_proposal(&NewProposal { ad_sender: a, ad_receiver: b, comment: "x".into() })
            .unwrap();
        let reversed = NewProposal { ad_sender: b, ad_receiver: a, comment: "y".into() };
        assert!(matches!(store.insert_proposal(&reversed), Err(StoreError::Conflict)));

        let mut rejected = first.clone();
        rejected.status = ProposalStatus::Rejected;
        store.update_proposal(&rejected, ProposalStatus::Waiting).unwrap();
        assert!(store.insert_proposal(&reversed).is_ok());
    }

    #[test]
    fn update_refused_once_status_moved_on() {
        let store = MemoryStore::new();
        let a = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;
        let b = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;
        let p = store
            .insert_proposal(&NewProposal { ad_sender: a, ad_receiver: b, comment: "x".into() })
            .unwrap();

        let mut accepted = p.clone();
        accepted.status = ProposalStatus::Accepted;
        store.update_proposal(&accepted, ProposalStatus::Waiting).unwrap();

        // a writer that still believes the proposal is waiting
        let mut edited = p.clone();
        edited.comment = "changed".into();
        assert!(matches!(
            store.update_proposal(&edited, ProposalStatus::Waiting),
            Err(StoreError::Stale)
        ));

        let stored = store.get_proposal(p.id).unwrap().unwrap();
        assert_eq!(stored.status, ProposalStatus::Accepted);
        assert_eq!(stored.comment, "x");
    }

    #[test]
    fn deleting_an_ad_cascades() {
        let store = MemoryStore::new();
        let a = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;
        let b = store.insert_ad(Uuid::new_v4(), &input()).unwrap().id;
        let p = store
            .insert_proposal(&NewProposal { ad_sender: a, ad_receiver: b, comment: "x".into() })
            .unwrap();

        assert!(store.delete_ad(b).unwrap());
        assert!(store.get_proposal(p.id).unwrap().is_none());
        assert!(!store.delete_ad(b).unwrap());
    }

    #[test]
    fn ads_listed_newest_first() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let ids: Vec<AdId> = (0..4)
            .map(|_| store.insert_ad(owner, &input()).unwrap().id)
            .collect();

        let page: Vec<AdId> = store.list_ads(2, 1).unwrap().into_iter().map(|a| a.id).collect();
        assert_eq!(page, vec![ids[2], ids[1]]);
    }
}
