pub mod movie;
pub mod rating;
pub mod user;

pub use movie::{Movie, NewMovie};
pub use rating::{average_score, MovieRatingRow, Rating, Score, ScoreOutOfRange, UserRatingRow};
pub use user::{NewUser, User};

/// Primary key of a user row
pub type UserId = i64;
/// Primary key of a movie row
pub type MovieId = i64;
/// Primary key of a rating row
pub type RatingId = i64;
