use serde::Serialize;

use crate::{
    db::RatingsStore,
    error::{AppError, AppResult},
    models::{
        average_score, movie::MAX_TITLE_LEN, Movie, MovieId, MovieRatingRow, NewMovie, User,
        UserId, UserRatingRow,
    },
};

/// A user's profile with every movie they rated
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub average_score: Option<u8>,
    pub ratings: Vec<UserRatingRow>,
}

/// A movie with every rating it received
#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub movie: Movie,
    pub release_date: Option<String>,
    pub average_score: Option<u8>,
    pub ratings: Vec<MovieRatingRow>,
}

pub async fn user_detail(store: &dyn RatingsStore, user_id: UserId) -> AppResult<UserDetail> {
    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

    let ratings = store.user_ratings_with_titles(user_id).await?;
    let average_score = average_score(ratings.iter().map(|r| r.score));

    Ok(UserDetail {
        user,
        average_score,
        ratings,
    })
}

pub async fn movie_detail(store: &dyn RatingsStore, movie_id: MovieId) -> AppResult<MovieDetail> {
    let movie = store
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movie {}", movie_id)))?;

    let ratings = store.movie_ratings_with_emails(movie_id).await?;
    let average_score = average_score(ratings.iter().map(|r| r.score));

    Ok(MovieDetail {
        release_date: movie.release_date(),
        movie,
        average_score,
        ratings,
    })
}

/// Adds a movie to the catalog
pub async fn add_movie(store: &dyn RatingsStore, movie: NewMovie) -> AppResult<Movie> {
    let title = movie.title.trim();

    if title.is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "title cannot be more than {} characters",
            MAX_TITLE_LEN
        )));
    }

    let movie = store
        .create_movie(NewMovie {
            title: title.to_string(),
            ..movie
        })
        .await?;

    tracing::info!(movie_id = movie.movie_id, title = %movie.title, "Movie added");

    Ok(movie)
}
