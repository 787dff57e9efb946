pub mod auth;
pub mod error;
mod goods;
mod orders;
mod users;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", get(auth::refresh))
        .route("/auth/me", get(auth::me))
        .route("/subscriptions", post(auth::subscribe));

    let catalog_routes = Router::new()
        .route("/goods", get(goods::list_goods))
        .route("/goods/:good_id", get(goods::get_good))
        .route("/categories", get(goods::list_categories))
        .route("/categories/:category_id", get(goods::get_category))
        .route("/feedbacks", get(goods::list_feedbacks).post(goods::create_feedback));

    let order_routes = Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/user", post(orders::create_order_for_user))
        .route("/orders/:order_id", patch(orders::patch_order));

    let user_routes = Router::new()
        .route("/users/me", patch(users::update_profile))
        .route("/users/me/avatar", patch(users::update_avatar));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(catalog_routes)
        .merge(order_routes)
        .merge(user_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(cors_layer(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured frontend origin. Without a
/// configured origin no cross-origin access is granted.
fn cors_layer(state: &AppState) -> CorsLayer {
    let Some(origin) = &state.config.cors.origin else {
        return CorsLayer::new();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE]),
        Err(_) => {
            warn!(origin = %origin, "Invalid CORS origin in config, cross-origin disabled");
            CorsLayer::new()
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
