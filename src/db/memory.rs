use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::EMAIL_TAKEN,
        Movie, MovieId, MovieRatingRow, NewMovie, NewUser, Rating, RatingId, Score, User, UserId,
        UserRatingRow,
    },
};

use super::RatingsStore;

/// In-process store used by tests and by `STORAGE_BACKEND=memory`
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryInner>>,
}

#[derive(Default)]
struct InMemoryInner {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
    ratings: BTreeMap<RatingId, Rating>,
    next_user_id: UserId,
    next_movie_id: MovieId,
    next_rating_id: RatingId,
}

impl InMemoryInner {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RatingsStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user_id = InMemoryInner::next_id(&mut inner.next_user_id);
        let user = user.into_user(user_id);
        inner.users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let mut inner = self.inner.write().await;
        let movie_id = InMemoryInner::next_id(&mut inner.next_movie_id);
        let movie = movie.into_movie(movie_id);
        inner.movies.insert(movie_id, movie.clone());
        Ok(movie)
    }

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>> {
        let inner = self.inner.read().await;
        Ok(inner.movies.get(&movie_id).cloned())
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let inner = self.inner.read().await;
        let mut movies: Vec<Movie> = inner.movies.values().cloned().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title).then(a.movie_id.cmp(&b.movie_id)));
        Ok(movies)
    }

    async fn ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ratings_by_users(&self, user_ids: &[UserId]) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| user_ids.contains(&r.user_id))
            .cloned()
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn user_ratings_with_titles(&self, user_id: UserId) -> AppResult<Vec<UserRatingRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| {
                inner.movies.get(&r.movie_id).map(|movie| UserRatingRow {
                    rating_id: r.rating_id,
                    movie_id: r.movie_id,
                    title: movie.title.clone(),
                    score: r.score,
                })
            })
            .collect())
    }

    async fn movie_ratings_with_emails(
        &self,
        movie_id: MovieId,
    ) -> AppResult<Vec<MovieRatingRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .ratings
            .values()
            .filter(|r| r.movie_id == movie_id)
            .filter_map(|r| {
                inner.users.get(&r.user_id).map(|user| MovieRatingRow {
                    rating_id: r.rating_id,
                    user_id: r.user_id,
                    email: user.email.clone(),
                    score: r.score,
                })
            })
            .collect())
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .ratings
            .values_mut()
            .find(|r| r.user_id == user_id && r.movie_id == movie_id)
        {
            existing.score = score;
            return Ok(existing.clone());
        }

        let rating_id = InMemoryInner::next_id(&mut inner.next_rating_id);
        let rating = Rating {
            rating_id,
            movie_id,
            user_id,
            score,
        };
        inner.ratings.insert(rating_id, rating.clone());
        Ok(rating)
    }
}
