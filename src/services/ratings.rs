use serde::Serialize;
use std::collections::HashMap;

use crate::{
    db::RatingsStore,
    error::{AppError, AppResult},
    models::{MovieId, Rating, Score, UserId},
    services::{
        prediction::{predict_rating, Neighbor},
        similarity::similarity,
    },
};

/// What the site knows about a user's opinion of one movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutcome {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// The user's own score, when they already rated the movie
    pub your_score: Option<Score>,
    /// Similarity-weighted estimate; `None` when the user already rated the movie
    /// or nobody similar has rated it
    pub predicted_score: Option<f64>,
    /// Number of other users who rated the movie
    pub rater_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityResponse {
    pub user_id: UserId,
    pub other_id: UserId,
    pub similarity: f64,
}

/// Creates or updates the user's rating of a movie
pub async fn rate_movie(
    store: &dyn RatingsStore,
    user_id: UserId,
    movie_id: MovieId,
    score: i32,
) -> AppResult<Rating> {
    let score = Score::try_from(score)?;

    if store.get_movie(movie_id).await?.is_none() {
        return Err(AppError::NotFound(format!("movie {}", movie_id)));
    }

    let rating = store.upsert_rating(user_id, movie_id, score).await?;
    tracing::info!(user_id, movie_id, score = %score, "Movie rated");

    Ok(rating)
}

/// Predicts how the user would rate a movie they have not rated yet
///
/// Loads the user's history and the history of everyone else who rated the movie,
/// then runs the similarity-weighted predictor over that snapshot.
pub async fn predict_for_user(
    store: &dyn RatingsStore,
    user_id: UserId,
    movie_id: MovieId,
) -> AppResult<PredictionOutcome> {
    if store.get_movie(movie_id).await?.is_none() {
        return Err(AppError::NotFound(format!("movie {}", movie_id)));
    }

    let movie_ratings = store.ratings_for_movie(movie_id).await?;
    let (own, others): (Vec<Rating>, Vec<Rating>) = movie_ratings
        .into_iter()
        .partition(|r| r.user_id == user_id);

    if let Some(existing) = own.first() {
        return Ok(PredictionOutcome {
            user_id,
            movie_id,
            your_score: Some(existing.score),
            predicted_score: None,
            rater_count: others.len(),
        });
    }

    let user_ids: Vec<UserId> = std::iter::once(user_id)
        .chain(others.iter().map(|r| r.user_id))
        .collect();

    let mut histories: HashMap<UserId, Vec<Rating>> = HashMap::new();
    for rating in store.ratings_by_users(&user_ids).await? {
        histories.entry(rating.user_id).or_default().push(rating);
    }

    let target_history = histories.remove(&user_id).unwrap_or_default();
    let neighbors: Vec<Neighbor<'_>> = others
        .iter()
        .map(|rating| Neighbor {
            rating,
            history: histories
                .get(&rating.user_id)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        })
        .collect();

    let predicted_score = predict_rating(user_id, &target_history, &neighbors);

    tracing::info!(
        user_id,
        movie_id,
        raters = others.len(),
        predicted = ?predicted_score,
        "Rating predicted"
    );

    Ok(PredictionOutcome {
        user_id,
        movie_id,
        your_score: None,
        predicted_score,
        rater_count: others.len(),
    })
}

/// Pearson similarity between two existing users
pub async fn similarity_between(
    store: &dyn RatingsStore,
    user_id: UserId,
    other_id: UserId,
) -> AppResult<SimilarityResponse> {
    for id in [user_id, other_id] {
        if store.get_user(id).await?.is_none() {
            return Err(AppError::NotFound(format!("user {}", id)));
        }
    }

    let first = store.ratings_by_user(user_id).await?;
    let second = store.ratings_by_user(other_id).await?;

    Ok(SimilarityResponse {
        user_id,
        other_id,
        similarity: similarity(&first, &second),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, MockRatingsStore};
    use crate::models::{Movie, NewMovie, NewUser};

    fn movie(movie_id: MovieId) -> Movie {
        NewMovie {
            title: format!("Movie {}", movie_id),
            released_at: None,
            imdb_url: None,
        }
        .into_movie(movie_id)
    }

    fn rating(rating_id: i64, user_id: UserId, movie_id: MovieId, score: i32) -> Rating {
        Rating {
            rating_id,
            movie_id,
            user_id,
            score: Score::try_from(score).unwrap(),
        }
    }

    async fn seed_user(store: &InMemoryStore, email: &str) -> UserId {
        store
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: "h".to_string(),
                age: None,
                zipcode: None,
            })
            .await
            .unwrap()
            .user_id
    }

    async fn seed_movie(store: &InMemoryStore, title: &str) -> MovieId {
        store
            .create_movie(NewMovie {
                title: title.to_string(),
                released_at: None,
                imdb_url: None,
            })
            .await
            .unwrap()
            .movie_id
    }

    async fn rate(store: &InMemoryStore, user_id: UserId, movie_id: MovieId, score: i32) {
        rate_movie(store, user_id, movie_id, score).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_movie_rejects_bad_score_without_touching_store() {
        let mut store = MockRatingsStore::new();
        store.expect_get_movie().never();
        store.expect_upsert_rating().never();

        let err = rate_movie(&store, 1, 1, 6).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_rate_unknown_movie() {
        let mut store = MockRatingsStore::new();
        store.expect_get_movie().returning(|_| Ok(None));
        store.expect_upsert_rating().never();

        let err = rate_movie(&store, 1, 99, 3).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_predict_loads_histories_in_one_call() {
        let mut store = MockRatingsStore::new();
        store.expect_get_movie().returning(|id| Ok(Some(movie(id))));
        store
            .expect_ratings_for_movie()
            .returning(|id| Ok(vec![rating(10, 2, id, 4), rating(11, 3, id, 2)]));
        store.expect_ratings_by_user().never();
        store
            .expect_ratings_by_users()
            .withf(|user_ids| user_ids.to_vec() == vec![1, 2, 3])
            .times(1)
            .returning(|_| {
                Ok(vec![
                    rating(1, 1, 1, 1),
                    rating(2, 1, 2, 2),
                    rating(3, 1, 3, 3),
                    rating(4, 2, 1, 1),
                    rating(5, 2, 2, 2),
                    rating(6, 2, 3, 3),
                    rating(7, 3, 1, 1),
                    rating(8, 3, 2, 3),
                    rating(9, 3, 3, 2),
                ])
            });

        let outcome = predict_for_user(&store, 1, 100).await.unwrap();
        assert_eq!(outcome.your_score, None);
        assert_eq!(outcome.rater_count, 2);
        let predicted = outcome.predicted_score.unwrap();
        assert!((predicted - 5.0 / 1.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_predict_returns_existing_score() {
        let store = InMemoryStore::new();
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let heat = seed_movie(&store, "Heat").await;
        rate(&store, ada, heat, 2).await;
        rate(&store, bob, heat, 5).await;

        let outcome = predict_for_user(&store, ada, heat).await.unwrap();
        assert_eq!(outcome.your_score, Some(Score::try_from(2).unwrap()));
        assert_eq!(outcome.predicted_score, None);
        assert_eq!(outcome.rater_count, 1);
    }

    #[tokio::test]
    async fn test_predict_without_overlap_is_none() {
        let store = InMemoryStore::new();
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let alien = seed_movie(&store, "Alien").await;
        let heat = seed_movie(&store, "Heat").await;
        rate(&store, ada, alien, 4).await;
        rate(&store, bob, heat, 5).await;

        let outcome = predict_for_user(&store, ada, heat).await.unwrap();
        assert_eq!(outcome.predicted_score, None);
        assert_eq!(outcome.rater_count, 1);
    }

    #[tokio::test]
    async fn test_similarity_between_users() {
        let store = InMemoryStore::new();
        let u1 = seed_user(&store, "u1@example.com").await;
        let u3 = seed_user(&store, "u3@example.com").await;
        let m1 = seed_movie(&store, "M1").await;
        let m2 = seed_movie(&store, "M2").await;
        rate(&store, u1, m1, 5).await;
        rate(&store, u1, m2, 1).await;
        rate(&store, u3, m1, 1).await;
        rate(&store, u3, m2, 5).await;

        let response = similarity_between(&store, u1, u3).await.unwrap();
        assert_eq!(response.similarity, -1.0);

        let err = similarity_between(&store, u1, 404).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
