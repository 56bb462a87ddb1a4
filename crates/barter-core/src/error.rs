use std::fmt;

use barter_types::models::{AdId, ProposalAction, ProposalId, ProposalStatus};

/// Input field an error is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    AdSender,
    AdReceiver,
    Comment,
    Action,
    Title,
    Description,
    Category,
    Condition,
    ImageUrl,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::AdSender => "ad_sender",
            Field::AdReceiver => "ad_receiver",
            Field::Comment => "comment",
            Field::Action => "action",
            Field::Title => "title",
            Field::Description => "description",
            Field::Category => "category",
            Field::Condition => "condition",
            Field::ImageUrl => "image_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An active proposal already holds this ad pair.
    #[error("active proposal already exists for this ad pair")]
    Conflict,

    /// The record no longer holds the status the write was based on.
    #[error("record changed since it was read")]
    Stale,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("ad #{id} does not exist")]
    AdNotFound { field: Field, id: AdId },

    /// A plain ad lookup outside any proposal.
    #[error("ad #{0} does not exist")]
    UnknownAd(AdId),

    #[error("exchange proposal #{0} does not exist")]
    ProposalNotFound(ProposalId),

    /// `owned_ads` lists the actor's own ads so the caller can pick one.
    #[error("ad is not yours; your ads: {}", join_ids(.owned_ads))]
    NotOwner { owned_ads: Vec<AdId> },

    #[error("cannot propose an exchange for your own ad #{0}")]
    SelfExchange(AdId),

    #[error("an ad cannot be exchanged for itself")]
    SameAd,

    #[error("{0}")]
    InvalidComment(&'static str),

    #[error("{field}: {reason}")]
    InvalidAd { field: Field, reason: &'static str },

    #[error("exchange of these ads is already {status} (proposal #{existing})")]
    Duplicate {
        existing: ProposalId,
        status: ProposalStatus,
    },

    #[error("forbidden")]
    Forbidden,

    #[error("unknown action {0:?}")]
    InvalidAction(String),

    #[error("cannot {action} a proposal that is {from}")]
    InvalidTransition {
        from: ProposalStatus,
        action: ProposalAction,
    },

    /// Another request changed the proposal between read and write.
    #[error("proposal #{id} is now {status}; reload and retry")]
    Stale {
        id: ProposalId,
        status: ProposalStatus,
    },

    #[error("only waiting proposals can be edited (currently {0})")]
    NotEditable(ProposalStatus),

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ExchangeError {
    /// Field the error belongs to, or `None` for global and authorization errors.
    pub fn field(&self) -> Option<Field> {
        match self {
            ExchangeError::AdNotFound { field, .. } => Some(*field),
            ExchangeError::NotOwner { .. } => Some(Field::AdSender),
            ExchangeError::SelfExchange(_) | ExchangeError::SameAd => Some(Field::AdReceiver),
            ExchangeError::InvalidComment(_) => Some(Field::Comment),
            ExchangeError::InvalidAd { field, .. } => Some(*field),
            ExchangeError::Duplicate { .. } => Some(Field::AdSender),
            ExchangeError::InvalidAction(_) => Some(Field::Action),
            ExchangeError::ProposalNotFound(_)
            | ExchangeError::UnknownAd(_)
            | ExchangeError::Forbidden
            | ExchangeError::InvalidTransition { .. }
            | ExchangeError::NotEditable(_)
            | ExchangeError::Stale { .. }
            | ExchangeError::Store(_) => None,
        }
    }
}

fn join_ids(ids: &[AdId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
