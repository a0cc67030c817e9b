use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        // Users
        .route("/users", get(handlers::list_users))
        .route("/users/:user_id", get(handlers::user_detail))
        .route(
            "/users/:user_id/similarity/:other_id",
            get(handlers::user_similarity),
        )
        // Movies
        .route("/movies", get(handlers::list_movies).post(handlers::create_movie))
        .route("/movies/:movie_id", get(handlers::movie_detail))
        .route("/movies/:movie_id/rating", put(handlers::rate_movie))
        .route("/movies/:movie_id/prediction", get(handlers::predict))
}
