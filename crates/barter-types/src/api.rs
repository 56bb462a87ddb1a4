use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Ad, AdId, ExchangeProposal, ProposalId};

// -- JWT Claims --

/// JWT claims shared by the token issuer (auth handlers) and the request guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Listing --

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub items: Vec<T>,
    pub has_next: bool,
}

// -- Exchanges --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProposalRequest {
    pub ad_sender: AdId,
    pub ad_receiver: AdId,
    #[serde(default)]
    pub comment: String,
}

/// The action arrives as a raw token so an unknown value can be reported
/// against the `action` field instead of failing body extraction.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionRequest {
    pub action: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProposalDetailResponse {
    #[serde(flatten)]
    pub proposal: ExchangeProposal,
    pub sender_ad: Ad,
    pub receiver_ad: Ad,
    pub is_sender: bool,
    pub is_receiver: bool,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_proposal: Option<ProposalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_ads: Option<Vec<AdId>>,
}
