use crate::models::{Rating, UserId};

use super::similarity::similarity;

/// Someone else's rating of the movie being predicted, with that rater's full history
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub rating: &'a Rating,
    pub history: &'a [Rating],
}

/// Scores every other rater of a movie by similarity to the target user
///
/// Returns (similarity, rating) pairs sorted from most to least similar, keeping
/// only raters with positive similarity. Ratings written by the target user are
/// skipped.
pub fn rank_neighbors<'a>(
    target_user: UserId,
    target_history: &[Rating],
    neighbors: &[Neighbor<'a>],
) -> Vec<(f64, &'a Rating)> {
    let mut ranked: Vec<(f64, &'a Rating)> = neighbors
        .iter()
        .filter(|n| n.rating.user_id != target_user)
        .map(|n| (similarity(target_history, n.history), n.rating))
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.retain(|(sim, _)| *sim > 0.0);
    ranked
}

/// Similarity-weighted mean of the neighbors' scores for one movie
///
/// `None` means no other rater is positively similar to the target, so no
/// prediction can be made. The result is not clamped to the rating scale.
pub fn predict_rating(
    target_user: UserId,
    target_history: &[Rating],
    neighbors: &[Neighbor<'_>],
) -> Option<f64> {
    let ranked = rank_neighbors(target_user, target_history, neighbors);

    if ranked.is_empty() {
        return None;
    }

    let numerator: f64 = ranked.iter().map(|(sim, r)| r.score.as_f64() * sim).sum();
    let denominator: f64 = ranked.iter().map(|(sim, _)| sim).sum();

    tracing::debug!(
        target_user,
        contributors = ranked.len(),
        "Computed weighted prediction"
    );

    Some(numerator / denominator)
}
