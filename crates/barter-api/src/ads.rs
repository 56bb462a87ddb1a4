use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use barter_types::api::{Claims, Page, PageQuery};
use barter_types::models::{AdId, AdInput};

use crate::auth::AppState;
use crate::error::{ApiError, blocking};

pub async fn list_ads(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let (items, has_next) = blocking(move || state.ads.list(page)).await?;

    Ok(Json(Page { page, items, has_next }))
}

pub async fn get_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<AdId>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = blocking(move || state.ads.get(ad_id)).await?;
    Ok(Json(ad))
}

pub async fn my_ads(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let ads = blocking(move || state.ads.list_owned(claims.sub)).await?;
    Ok(Json(ads))
}

pub async fn create_ad(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<AdInput>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = blocking(move || state.ads.create(claims.sub, input)).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

pub async fn update_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<AdId>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<AdInput>,
) -> Result<impl IntoResponse, ApiError> {
    let ad = blocking(move || state.ads.update(ad_id, claims.sub, input)).await?;
    Ok(Json(ad))
}

pub async fn delete_ad(
    State(state): State<AppState>,
    Path(ad_id): Path<AdId>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || state.ads.delete(ad_id, claims.sub)).await?;
    Ok(StatusCode::NO_CONTENT)
}
