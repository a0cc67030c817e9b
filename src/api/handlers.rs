use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::{CurrentUser, RequestId},
    models::{Movie, MovieId, NewMovie, Rating, User, UserId},
    services::{
        accounts::{self, LoginRequest, LoginResponse, RegisterRequest},
        catalog::{self, MovieDetail, UserDetail},
        ratings::{self, PredictionOutcome, SimilarityResponse},
    },
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RateMovieRequest {
    pub score: i32,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    tracing::info!(request_id = %request_id, "Processing registration");

    let user = accounts::register(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in and receive a session token
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    tracing::info!(request_id = %request_id, "Processing login");

    let response =
        accounts::login(state.store.as_ref(), state.sessions.as_ref(), request).await?;
    Ok(Json(response))
}

/// End the caller's session
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<StatusCode> {
    accounts::logout(state.sessions.as_ref(), &current.token).await?;
    tracing::info!(user_id = current.user_id, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// A user with their ratings
pub async fn user_detail(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<UserDetail>> {
    Ok(Json(catalog::user_detail(state.store.as_ref(), user_id).await?))
}

/// How similarly two users rate the movies they share
pub async fn user_similarity(
    State(state): State<AppState>,
    Path((user_id, other_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<SimilarityResponse>> {
    let response = ratings::similarity_between(state.store.as_ref(), user_id, other_id).await?;
    Ok(Json(response))
}

/// List all movies ordered by title
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.store.list_movies().await?))
}

/// Add a movie to the catalog
pub async fn create_movie(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    tracing::debug!(user_id = current.user_id, "Adding movie");

    let movie = catalog::add_movie(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// A movie with its ratings
pub async fn movie_detail(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(catalog::movie_detail(state.store.as_ref(), movie_id).await?))
}

/// Create or update the caller's rating of a movie
pub async fn rate_movie(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(movie_id): Path<MovieId>,
    Json(request): Json<RateMovieRequest>,
) -> AppResult<Json<Rating>> {
    tracing::info!(
        request_id = %request_id,
        user_id = current.user_id,
        movie_id,
        "Processing rating"
    );

    let rating =
        ratings::rate_movie(state.store.as_ref(), current.user_id, movie_id, request.score)
            .await?;
    Ok(Json(rating))
}

/// Predicted score for the caller on a movie they have not rated
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    current: CurrentUser,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<PredictionOutcome>> {
    tracing::info!(
        request_id = %request_id,
        user_id = current.user_id,
        movie_id,
        "Processing prediction request"
    );

    let outcome =
        ratings::predict_for_user(state.store.as_ref(), current.user_id, movie_id).await?;
    Ok(Json(outcome))
}
