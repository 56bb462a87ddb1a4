pub mod ads;
pub mod auth;
pub mod error;
pub mod exchanges;
pub mod middleware;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::auth::AppState;

/// Every REST route. Reads of ads are public; everything else sits behind
/// the bearer-token guard.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/ads", get(ads::list_ads))
        .route("/ads/{ad_id}", get(ads::get_ad));

    let protected_routes = Router::new()
        .route("/ads", post(ads::create_ad))
        .route("/ads/{ad_id}", put(ads::update_ad).delete(ads::delete_ad))
        .route("/me", get(auth::me))
        .route("/me/ads", get(ads::my_ads))
        .route("/exchanges", get(exchanges::list_exchanges).post(exchanges::create_exchange))
        .route(
            "/exchanges/{proposal_id}",
            get(exchanges::get_exchange)
                .put(exchanges::edit_exchange)
                .delete(exchanges::delete_exchange),
        )
        .route("/exchanges/{proposal_id}/status", post(exchanges::apply_action))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
