use crate::{
    error::AppResult,
    models::{
        Movie, MovieId, MovieRatingRow, NewMovie, NewUser, Rating, Score, User, UserId,
        UserRatingRow,
    },
};

/// Data access for users, movies and ratings
///
/// Handlers never talk to a database directly; they receive an implementation of
/// this trait through the application state. Implementations must keep at most one
/// rating per (user, movie) pair, which [`RatingsStore::upsert_rating`] preserves.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsStore: Send + Sync {
    /// Inserts a user. A duplicate email is a `Conflict`.
    async fn create_user(&self, user: NewUser) -> AppResult<User>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie>;

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>>;

    /// All movies ordered by title
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;

    /// Every rating the user wrote, in creation order
    async fn ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>>;

    /// Every rating written by any of the users, in creation order
    async fn ratings_by_users(&self, user_ids: &[UserId]) -> AppResult<Vec<Rating>>;

    /// Every rating of the movie, in creation order
    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>>;

    async fn user_ratings_with_titles(&self, user_id: UserId) -> AppResult<Vec<UserRatingRow>>;

    async fn movie_ratings_with_emails(&self, movie_id: MovieId)
        -> AppResult<Vec<MovieRatingRow>>;

    /// Updates the user's existing rating of the movie in place, or inserts one
    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating>;
}
