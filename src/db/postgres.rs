use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::{AppError, AppResult},
    models::{
        user::EMAIL_TAKEN,
        Movie, MovieId, MovieRatingRow, NewMovie, NewUser, Rating, Score, User, UserId,
        UserRatingRow,
    },
};

use super::RatingsStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the SQL files under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "user_id, email, password_hash, age, zipcode";
const MOVIE_COLUMNS: &str = "movie_id, title, released_at, imdb_url";
const RATING_COLUMNS: &str = "rating_id, movie_id, user_id, score";

#[async_trait::async_trait]
impl RatingsStore for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, age, zipcode) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.age)
        .bind(user.zipcode)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict(EMAIL_TAKEN.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY user_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_movie(&self, movie: NewMovie) -> AppResult<Movie> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies (title, released_at, imdb_url) \
             VALUES ($1, $2, $3) RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(movie.title)
        .bind(movie.released_at)
        .bind(movie.imdb_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn get_movie(&self, movie_id: MovieId) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = $1"
        ))
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movie)
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY title, movie_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(movies)
    }

    async fn ratings_by_user(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 ORDER BY rating_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn ratings_by_users(&self, user_ids: &[UserId]) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = ANY($1) ORDER BY rating_id"
        ))
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn ratings_for_movie(&self, movie_id: MovieId) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE movie_id = $1 ORDER BY rating_id"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn user_ratings_with_titles(&self, user_id: UserId) -> AppResult<Vec<UserRatingRow>> {
        let rows = sqlx::query_as::<_, UserRatingRow>(
            r#"
            SELECT r.rating_id, r.movie_id, m.title, r.score
            FROM ratings r
            JOIN movies m ON m.movie_id = r.movie_id
            WHERE r.user_id = $1
            ORDER BY r.rating_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn movie_ratings_with_emails(
        &self,
        movie_id: MovieId,
    ) -> AppResult<Vec<MovieRatingRow>> {
        let rows = sqlx::query_as::<_, MovieRatingRow>(
            r#"
            SELECT r.rating_id, r.user_id, u.email, r.score
            FROM ratings r
            JOIN users u ON u.user_id = r.user_id
            WHERE r.movie_id = $1
            ORDER BY r.rating_id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_rating(
        &self,
        user_id: UserId,
        movie_id: MovieId,
        score: Score,
    ) -> AppResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            "INSERT INTO ratings (movie_id, user_id, score) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, movie_id) DO UPDATE SET score = EXCLUDED.score \
             RETURNING {RATING_COLUMNS}"
        ))
        .bind(movie_id)
        .bind(user_id)
        .bind(i32::from(score))
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id, movie_id, score = %score, "Rating upserted");

        Ok(rating)
    }
}
