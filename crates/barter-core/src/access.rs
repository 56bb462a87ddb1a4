//! Authorization predicates over the two parties of a proposal.

use barter_types::models::{Ad, UserId};

use crate::error::{ExchangeError, ExchangeResult};

/// Owners of the two ads a proposal links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parties {
    pub sender: UserId,
    pub receiver: UserId,
}

impl Parties {
    pub fn of(sender_ad: &Ad, receiver_ad: &Ad) -> Self {
        Self {
            sender: sender_ad.owner,
            receiver: receiver_ad.owner,
        }
    }
}

pub fn is_sender(user: UserId, parties: &Parties) -> bool {
    parties.sender == user
}

pub fn is_receiver(user: UserId, parties: &Parties) -> bool {
    parties.receiver == user
}

pub fn is_participant(user: UserId, parties: &Parties) -> bool {
    is_sender(user, parties) || is_receiver(user, parties)
}

/// Turns a failed predicate into [`ExchangeError::Forbidden`].
pub fn require(allowed: bool) -> ExchangeResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(ExchangeError::Forbidden)
    }
}
