use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use barter_core::ExchangeError;
use barter_types::api::ErrorBody;

/// JSON error response. Validation failures name the offending field;
/// authorization failures carry only the status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                field: None,
                existing_proposal: None,
                owned_ads: None,
            },
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl From<ExchangeError> for ApiError {
    fn from(err: ExchangeError) -> Self {
        let status = match &err {
            ExchangeError::AdNotFound { .. }
            | ExchangeError::UnknownAd(_)
            | ExchangeError::ProposalNotFound(_) => StatusCode::NOT_FOUND,
            ExchangeError::Forbidden => StatusCode::FORBIDDEN,
            ExchangeError::NotOwner { .. }
            | ExchangeError::SelfExchange(_)
            | ExchangeError::SameAd
            | ExchangeError::InvalidComment(_)
            | ExchangeError::InvalidAd { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ExchangeError::Duplicate { .. }
            | ExchangeError::InvalidTransition { .. }
            | ExchangeError::NotEditable(_)
            | ExchangeError::Stale { .. } => StatusCode::CONFLICT,
            ExchangeError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            ExchangeError::Store(e) => {
                error!("Store error: {}", e);
                return Self::internal();
            }
        };

        if status == StatusCode::FORBIDDEN {
            return Self::new(status, "forbidden");
        }

        let mut api = Self::new(status, err.to_string());
        api.body.field = err.field().map(|f| f.as_str().to_string());
        match err {
            ExchangeError::Duplicate { existing, .. } => api.body.existing_proposal = Some(existing),
            ExchangeError::NotOwner { owned_ads } => api.body.owned_ads = Some(owned_ads),
            _ => {}
        }
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Runs store-bound work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ExchangeError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}
