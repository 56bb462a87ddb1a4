//! Exchange proposal lifecycle against the in-memory store: creation rules,
//! duplicate detection, visibility, and the receiver's actions.

use std::sync::Arc;

use barter_core::memory::MemoryStore;
use barter_core::{AdStore, ExchangeEngine, ExchangeError, Field, NewProposal, TransitionPolicy};
use barter_types::models::{AdId, AdInput, ProposalAction, ProposalId, ProposalStatus, UserId};
use uuid::Uuid;

struct Market {
    store: Arc<MemoryStore>,
    engine: ExchangeEngine<MemoryStore>,
}

impl Market {
    fn new(policy: TransitionPolicy) -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = ExchangeEngine::new(store.clone(), policy);
        Self { store, engine }
    }

    fn ad(&self, owner: UserId, title: &str) -> AdId {
        let input = AdInput {
            title: title.into(),
            description: format!("{title} for trade"),
            category: "misc".into(),
            condition: "used".into(),
            image_url: None,
        };
        self.store.insert_ad(owner, &input).unwrap().id
    }

    fn propose(&self, user: UserId, sender: AdId, receiver: AdId, comment: &str) -> Result<ProposalId, ExchangeError> {
        self.engine
            .create(
                user,
                NewProposal {
                    ad_sender: sender,
                    ad_receiver: receiver,
                    comment: comment.into(),
                },
            )
            .map(|p| p.id)
    }

    fn listed(&self, user: UserId) -> Vec<ProposalId> {
        let mut ids: Vec<_> = self.engine.list_for(user).unwrap().into_iter().map(|p| p.id).collect();
        ids.sort();
        ids
    }
}

#[test]
fn valid_proposal_starts_waiting() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));

    let id = m.propose(u1, a1, a2, "hi").unwrap();
    let detail = m.engine.get(id, u1).unwrap();
    assert_eq!(detail.proposal.status, ProposalStatus::Waiting);
    assert_eq!(detail.proposal.comment, "hi");
    assert_eq!(detail.sender_ad.owner, u1);
    assert_eq!(detail.receiver_ad.owner, u2);
}

#[test]
fn counter_proposal_while_waiting_is_duplicate() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));

    let first = m.propose(u1, a1, a2, "hi").unwrap();
    let err = m.propose(u2, a2, a1, "counter").unwrap_err();
    match err {
        ExchangeError::Duplicate { existing, status } => {
            assert_eq!(existing, first);
            assert_eq!(status, ProposalStatus::Waiting);
        }
        other => panic!("expected duplicate, got {other:?}"),
    }

    // same direction again
    assert!(matches!(m.propose(u1, a1, a2, "again"), Err(ExchangeError::Duplicate { .. })));
}

#[test]
fn accepted_pair_stays_blocked_rejected_pair_frees_up() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2, a3) = (m.ad(u1, "bike"), m.ad(u2, "kettle"), m.ad(u2, "chair"));

    let accepted = m.propose(u1, a1, a2, "hi").unwrap();
    m.engine.apply_action(accepted, ProposalAction::Accept, u2).unwrap();
    assert!(matches!(
        m.propose(u2, a2, a1, "x"),
        Err(ExchangeError::Duplicate { status: ProposalStatus::Accepted, .. })
    ));

    let rejected = m.propose(u1, a1, a3, "hi").unwrap();
    m.engine.apply_action(rejected, ProposalAction::Reject, u2).unwrap();
    let forward = m.propose(u1, a1, a3, "second try").unwrap();
    assert_ne!(forward, rejected);

    // the old rejected row is kept
    assert_eq!(
        m.engine.get(rejected, u1).unwrap().proposal.status,
        ProposalStatus::Rejected
    );
}

#[test]
fn reverse_direction_allowed_after_rejection() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));

    let first = m.propose(u1, a1, a2, "hi").unwrap();
    m.engine.apply_action(first, ProposalAction::Reject, u2).unwrap();
    assert!(m.propose(u2, a2, a1, "how about this way").is_ok());
}

#[test]
fn foreign_sender_ad_lists_actor_ads() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let a1b = m.ad(u1, "helmet");

    let err = m.propose(u1, a2, a1, "x").unwrap_err();
    assert_eq!(err.field(), Some(Field::AdSender));
    match err {
        ExchangeError::NotOwner { owned_ads } => assert_eq!(owned_ads, vec![a1, a1b]),
        other => panic!("expected ownership error, got {other:?}"),
    }
}

#[test]
fn targeting_own_ad_is_self_exchange() {
    let m = Market::new(TransitionPolicy::Strict);
    let u1 = Uuid::new_v4();
    let (a1, a1b) = (m.ad(u1, "bike"), m.ad(u1, "helmet"));

    let err = m.propose(u1, a1, a1b, "x").unwrap_err();
    assert!(matches!(err, ExchangeError::SelfExchange(id) if id == a1b));
    assert_eq!(err.field(), Some(Field::AdReceiver));

    // same ad on both sides takes the same path
    assert!(matches!(m.propose(u1, a1, a1, "x"), Err(ExchangeError::SelfExchange(_))));
}

#[test]
fn listing_is_limited_to_participants() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2, a3) = (m.ad(u1, "bike"), m.ad(u2, "kettle"), m.ad(u3, "chair"));

    let p12 = m.propose(u1, a1, a2, "1->2").unwrap();
    let p23 = m.propose(u2, a2, a3, "2->3").unwrap();
    let p31 = m.propose(u3, a3, a1, "3->1").unwrap();

    assert_eq!(m.listed(u1), vec![p12, p31]);
    assert_eq!(m.listed(u2), vec![p12, p23]);
    assert_eq!(m.listed(u3), vec![p23, p31]);

    assert!(matches!(m.engine.get(p23, u1), Err(ExchangeError::Forbidden)));
    assert!(m.engine.get(p23, u2).is_ok());
    assert!(m.engine.get(p23, u3).is_ok());
}

#[test]
fn only_receiver_acts() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let p = m.propose(u1, a1, a2, "hi").unwrap();

    let rejected = m.engine.apply_action(p, ProposalAction::Reject, u2).unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);

    assert!(matches!(
        m.engine.apply_action(p, ProposalAction::Accept, u1),
        Err(ExchangeError::Forbidden)
    ));
    assert_eq!(m.engine.get(p, u1).unwrap().proposal.status, ProposalStatus::Rejected);
}

#[test]
fn recreate_swaps_roles_and_reopens() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let p = m.propose(u1, a1, a2, "hi").unwrap();
    m.engine.apply_action(p, ProposalAction::Reject, u2).unwrap();

    let reopened = m.engine.apply_action(p, ProposalAction::Recreate, u2).unwrap();
    assert_eq!(reopened.id, p);
    assert_eq!((reopened.ad_sender, reopened.ad_receiver), (a2, a1));
    assert_eq!(reopened.status, ProposalStatus::Waiting);
    assert_eq!(reopened.comment, "hi");

    // roles flipped: u1 now decides, u2 now owns the proposal
    assert!(matches!(
        m.engine.apply_action(p, ProposalAction::Accept, u2),
        Err(ExchangeError::Forbidden)
    ));
    assert_eq!(
        m.engine.apply_action(p, ProposalAction::Accept, u1).unwrap().status,
        ProposalStatus::Accepted
    );
}

#[test]
fn strict_policy_guards_resolved_proposals() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let p = m.propose(u1, a1, a2, "hi").unwrap();
    m.engine.apply_action(p, ProposalAction::Reject, u2).unwrap();

    let err = m.engine.apply_action(p, ProposalAction::Accept, u2).unwrap_err();
    assert!(matches!(
        err,
        ExchangeError::InvalidTransition {
            from: ProposalStatus::Rejected,
            action: ProposalAction::Accept
        }
    ));
}

#[test]
fn permissive_policy_reaccepts_rejected() {
    let m = Market::new(TransitionPolicy::Permissive);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let p = m.propose(u1, a1, a2, "hi").unwrap();

    m.engine.apply_action(p, ProposalAction::Reject, u2).unwrap();
    let accepted = m.engine.apply_action(p, ProposalAction::Accept, u2).unwrap();
    assert_eq!(accepted.status, ProposalStatus::Accepted);

    // and an accepted proposal can still be rejected
    let rejected = m.engine.apply_action(p, ProposalAction::Reject, u2).unwrap();
    assert_eq!(rejected.status, ProposalStatus::Rejected);
}

#[test]
fn delete_is_sender_only_and_unlists() {
    let m = Market::new(TransitionPolicy::Strict);
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
    let (a1, a2) = (m.ad(u1, "bike"), m.ad(u2, "kettle"));
    let p = m.propose(u1, a1, a2, "hi").unwrap();
    m.engine.apply_action(p, ProposalAction::Accept, u2).unwrap();

    assert!(matches!(m.engine.delete(p, u2), Err(ExchangeError::Forbidden)));
    m.engine.delete(p, u1).unwrap();

    assert!(m.listed(u1).is_empty());
    assert!(m.listed(u2).is_empty());
    assert!(matches!(m.engine.get(p, u1), Err(ExchangeError::ProposalNotFound(_))));
}
