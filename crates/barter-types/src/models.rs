use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;
pub type AdId = i64;
pub type ProposalId = i64;

/// Public view of an account. The password hash never leaves the database crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A listed item available for exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub owner: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editable fields of an ad. Owner and timestamps are never client-supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A directed offer from the owner of `ad_sender` to trade for `ad_receiver`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeProposal {
    pub id: ProposalId,
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    pub comment: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
}

impl ExchangeProposal {
    /// True when the proposal links the two ads, in either direction.
    pub fn links(&self, a: AdId, b: AdId) -> bool {
        (self.ad_sender == a && self.ad_receiver == b)
            || (self.ad_sender == b && self.ad_receiver == a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Waiting,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Waiting => "waiting",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }

    /// Rejected proposals no longer hold the ad pair.
    pub fn is_active(self) -> bool {
        self != ProposalStatus::Rejected
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown proposal status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProposalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(ProposalStatus::Waiting),
            "accepted" => Ok(ProposalStatus::Accepted),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Actions the receiving party may take on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalAction {
    Accept,
    Reject,
    /// Swap sender and receiver and reopen the proposal as a counter-offer.
    Recreate,
}

impl ProposalAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalAction::Accept => "accept",
            ProposalAction::Reject => "reject",
            ProposalAction::Recreate => "recreate",
        }
    }
}

impl fmt::Display for ProposalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct UnknownAction(pub String);

impl FromStr for ProposalAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(ProposalAction::Accept),
            "reject" => Ok(ProposalAction::Reject),
            "recreate" => Ok(ProposalAction::Recreate),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
