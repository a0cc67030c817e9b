use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::MovieId;

/// Maximum length of a movie title
pub const MAX_TITLE_LEN: usize = 100;

/// A movie that users can rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub movie_id: MovieId,
    pub title: String,
    pub released_at: Option<DateTime<Utc>>,
    pub imdb_url: Option<String>,
}

/// Fields for a movie that has not been stored yet
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub released_at: Option<DateTime<Utc>>,
    pub imdb_url: Option<String>,
}

impl NewMovie {
    /// Assigns an id, producing the stored movie
    pub fn into_movie(self, movie_id: MovieId) -> Movie {
        Movie {
            movie_id,
            title: self.title,
            released_at: self.released_at,
            imdb_url: self.imdb_url,
        }
    }
}

impl Movie {
    /// Release date in the `Jan-01-1995` form shown on movie pages
    pub fn release_date(&self) -> Option<String> {
        self.released_at
            .map(|released| released.format("%b-%d-%Y").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_release_date_format() {
        let movie = NewMovie {
            title: "Toy Story".to_string(),
            released_at: Some(Utc.with_ymd_and_hms(1995, 11, 22, 0, 0, 0).unwrap()),
            imdb_url: None,
        }
        .into_movie(1);

        assert_eq!(movie.release_date().as_deref(), Some("Nov-22-1995"));
    }

    #[test]
    fn test_release_date_unknown() {
        let movie = NewMovie {
            title: "Untitled".to_string(),
            released_at: None,
            imdb_url: None,
        }
        .into_movie(2);

        assert_eq!(movie.release_date(), None);
    }
}
