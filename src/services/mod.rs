pub mod accounts;
pub mod catalog;
pub mod correlation;
pub mod prediction;
pub mod ratings;
pub mod similarity;

pub use prediction::{predict_rating, rank_neighbors, Neighbor};
pub use similarity::similarity;
