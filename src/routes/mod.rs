use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_response_headers_layer};
use crate::handlers::events::{
    create_event, create_upload_url, delete_event, get_event, list_events, update_event,
};
use crate::handlers::health_check;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/:id/upload-url", post(create_upload_url))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_response_headers_layer())
        .layer(create_cors_layer())
}
