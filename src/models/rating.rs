use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::Display;

use super::{MovieId, RatingId, UserId};

/// Lowest score a user can give a movie
pub const MIN_SCORE: i32 = 1;
/// Highest score a user can give a movie
pub const MAX_SCORE: i32 = 5;

/// Error returned when a raw integer falls outside the rating scale
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("score must be between 1 and 5, got {0}")]
pub struct ScoreOutOfRange(pub i32);

/// A validated rating score on the 1-5 star scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Score(u8);

impl Score {
    /// Returns the score as a float for use in similarity math
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (MIN_SCORE..=MAX_SCORE).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreOutOfRange(value))
        }
    }
}

impl From<Score> for i32 {
    fn from(score: Score) -> Self {
        i32::from(score.0)
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single user's score for a single movie
///
/// At most one rating exists per (user, movie) pair. Postgres enforces this with a
/// unique key and the in-memory store with its upsert; the similarity math assumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub rating_id: RatingId,
    pub movie_id: MovieId,
    pub user_id: UserId,
    #[sqlx(try_from = "i32")]
    pub score: Score,
}

/// A user's rating joined with the title of the rated movie
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UserRatingRow {
    pub rating_id: RatingId,
    pub movie_id: MovieId,
    pub title: String,
    #[sqlx(try_from = "i32")]
    pub score: Score,
}

/// A movie's rating joined with the email of the rater
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MovieRatingRow {
    pub rating_id: RatingId,
    pub user_id: UserId,
    pub email: String,
    #[sqlx(try_from = "i32")]
    pub score: Score,
}

/// Rounded mean of a set of scores, `None` when there are none
pub fn average_score<I>(scores: I) -> Option<u8>
where
    I: IntoIterator<Item = Score>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0.0, 0u32), |(sum, count), s| (sum + s.as_f64(), count + 1));

    if count == 0 {
        return None;
    }

    Some((sum / f64::from(count)).round() as u8)
}
