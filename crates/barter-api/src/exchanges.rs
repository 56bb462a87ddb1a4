use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use barter_core::{ExchangeError, NewProposal, ProposalDetail, access};
use barter_types::api::{ActionRequest, Claims, Page, PageQuery, ProposalDetailResponse, ProposalRequest};
use barter_types::models::{ProposalAction, ProposalId, UserId};

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

/// Proposals shown per page of a user's exchange list.
pub const PROPOSALS_PER_PAGE: usize = 15;

fn new_proposal(req: ProposalRequest) -> NewProposal {
    NewProposal {
        ad_sender: req.ad_sender,
        ad_receiver: req.ad_receiver,
        comment: req.comment,
    }
}

fn detail_response(detail: ProposalDetail, user: UserId) -> ProposalDetailResponse {
    let parties = detail.parties();
    ProposalDetailResponse {
        is_sender: access::is_sender(user, &parties),
        is_receiver: access::is_receiver(user, &parties),
        proposal: detail.proposal,
        sender_ad: detail.sender_ad,
        receiver_ad: detail.receiver_ad,
    }
}

pub async fn list_exchanges(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let all = blocking(move || state.engine.list_for(claims.sub)).await?;

    let start = (page as usize - 1).saturating_mul(PROPOSALS_PER_PAGE);
    let items: Vec<_> = all.iter().skip(start).take(PROPOSALS_PER_PAGE).cloned().collect();
    let has_next = all.len() > start.saturating_add(PROPOSALS_PER_PAGE);

    Ok(Json(Page { page, items, has_next }))
}

pub async fn create_exchange(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = blocking(move || state.engine.create(claims.sub, new_proposal(req))).await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

pub async fn get_exchange(
    State(state): State<AppState>,
    Path(proposal_id): Path<ProposalId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user = claims.sub;
    let detail = blocking(move || state.engine.get(proposal_id, user)).await?;
    Ok(Json(detail_response(detail, user)))
}

pub async fn edit_exchange(
    State(state): State<AppState>,
    Path(proposal_id): Path<ProposalId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal =
        blocking(move || state.engine.edit(proposal_id, claims.sub, new_proposal(req))).await?;
    Ok(Json(proposal))
}

pub async fn delete_exchange(
    State(state): State<AppState>,
    Path(proposal_id): Path<ProposalId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || state.engine.delete(proposal_id, claims.sub)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /exchanges/{id}/status with `{"action": "accept" | "reject" | "recreate"}`.
pub async fn apply_action(
    State(state): State<AppState>,
    Path(proposal_id): Path<ProposalId>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let action: ProposalAction = req.action.parse().map_err(|_| {
        debug!("Unknown action {:?} on proposal #{}", req.action, proposal_id);
        ApiError::from(ExchangeError::InvalidAction(req.action.clone()))
    })?;

    let proposal =
        blocking(move || state.engine.apply_action(proposal_id, action, claims.sub)).await?;
    Ok(Json(proposal))
}
