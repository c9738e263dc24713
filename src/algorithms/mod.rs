pub mod pivot;
pub mod ranker;
pub mod similarity;

pub use pivot::{build_pivot, PivotMatrix};
pub use ranker::{recommend_for_user, recommend_similar_items, recommend_similar_items_scored, similar_users};
pub use similarity::{cosine_similarity_matrix, item_similarity, user_similarity, SimilarityMatrix};

use crate::models::*;
use std::time::Instant;
use tracing::debug;

pub trait Recommender: Send + Sync {
    fn recommend_for_user(&self, user_id: UserId, n: usize, min_rating_threshold: f64) -> Vec<ItemId>;
    fn recommend_similar_items(&self, item_id: ItemId, n: usize) -> Vec<ItemId>;
}

/// Pivot plus both similarity matrices derived from one rating table.
///
/// Read-only once built; share it behind an `Arc` to serve concurrent queries.
#[derive(Debug, Clone, Default)]
pub struct CollaborativeFilter {
    pub pivot: PivotMatrix,
    pub user_similarity: SimilarityMatrix,
    pub item_similarity: SimilarityMatrix,
}

impl CollaborativeFilter {
    pub fn fit(ratings: &[RatingRecord]) -> Self {
        let start = Instant::now();
        let pivot = build_pivot(ratings);
        let user_similarity = user_similarity(&pivot);
        let item_similarity = item_similarity(&pivot);

        let (users, items) = pivot.shape();
        debug!(
            users,
            items,
            records = ratings.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built collaborative filter"
        );

        Self {
            pivot,
            user_similarity,
            item_similarity,
        }
    }

    pub fn similar_users(&self, user_id: UserId, n: usize) -> Vec<(UserId, f64)> {
        similar_users(user_id, &self.user_similarity, n)
    }

    pub fn similar_items_scored(&self, item_id: ItemId, n: usize) -> Vec<(ItemId, f64)> {
        recommend_similar_items_scored(item_id, &self.item_similarity, n)
    }
}

impl Recommender for CollaborativeFilter {
    fn recommend_for_user(&self, user_id: UserId, n: usize, min_rating_threshold: f64) -> Vec<ItemId> {
        recommend_for_user(user_id, &self.pivot, &self.user_similarity, n, min_rating_threshold)
    }

    fn recommend_similar_items(&self, item_id: ItemId, n: usize) -> Vec<ItemId> {
        recommend_similar_items(item_id, &self.item_similarity, n)
    }
}
