use std::collections::HashMap;

use crate::models::{MovieId, Rating, Score};

use super::correlation::pearson;

/// Pearson similarity between two users' rating histories
///
/// Only movies both users rated take part. Two users with no co-rated movies, or
/// whose co-rated scores have no variance, score 0.0.
pub fn similarity(first: &[Rating], second: &[Rating]) -> f64 {
    let pairs = paired_scores(first, second);

    if pairs.is_empty() {
        return 0.0;
    }

    pearson(&pairs)
}

/// (first score, second score) for every movie both histories contain
fn paired_scores(first: &[Rating], second: &[Rating]) -> Vec<(f64, f64)> {
    let by_movie: HashMap<MovieId, Score> = first.iter().map(|r| (r.movie_id, r.score)).collect();

    second
        .iter()
        .filter_map(|r| {
            by_movie
                .get(&r.movie_id)
                .map(|own| (own.as_f64(), r.score.as_f64()))
        })
        .collect()
}
