use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::routes::{data_analysis, health, portfolio, registry, sentiment, text_generation};
use crate::state::AppState;

fn ai_services_router() -> Router<AppState> {
    Router::new()
        .merge(sentiment::router())
        .merge(text_generation::router())
        .merge(data_analysis::router())
        .merge(registry::router())
}

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/ai_services", ai_services_router())
        .nest("/api", portfolio::router())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
