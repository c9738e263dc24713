use super::pivot::PivotMatrix;
use super::similarity::SimilarityMatrix;
use crate::models::{ItemId, UserId};
use std::collections::HashSet;

/// User-based neighbour aggregation.
///
/// Walks every other user from most to least similar and collects the items
/// each rated strictly above `min_rating_threshold`, in column order. The
/// first occurrence of an item wins its position. Items the target user has
/// rated at all are dropped, then the list is cut to `n`.
///
/// An unknown `user_id` yields an empty list.
pub fn recommend_for_user(
    user_id: UserId,
    pivot: &PivotMatrix,
    user_similarity: &SimilarityMatrix,
    n: usize,
    min_rating_threshold: f64,
) -> Vec<ItemId> {
    if n == 0 || pivot.user_position(user_id).is_none() {
        return Vec::new();
    }

    let already_rated: HashSet<ItemId> = pivot.rated_items(user_id).into_iter().collect();
    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut recommendations = Vec::new();

    for (neighbor, _) in user_similarity.ranked_neighbors(user_id) {
        let Some(row) = pivot.user_position(neighbor) else {
            continue;
        };

        for (item_id, rating) in pivot.row_entries(row) {
            if rating <= min_rating_threshold || !seen.insert(item_id) {
                continue;
            }
            if already_rated.contains(&item_id) {
                continue;
            }
            recommendations.push(item_id);
            if recommendations.len() >= n {
                return recommendations;
            }
        }
    }

    recommendations
}

/// Item-based nearest-neighbour lookup: the `n` items most similar to
/// `item_id`, excluding itself.
pub fn recommend_similar_items(
    item_id: ItemId,
    item_similarity: &SimilarityMatrix,
    n: usize,
) -> Vec<ItemId> {
    recommend_similar_items_scored(item_id, item_similarity, n)
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

pub fn recommend_similar_items_scored(
    item_id: ItemId,
    item_similarity: &SimilarityMatrix,
    n: usize,
) -> Vec<(ItemId, f64)> {
    let mut ranked = item_similarity.ranked_neighbors(item_id);
    ranked.truncate(n);
    ranked
}

/// The `n` users most similar to `user_id`, with their scores.
pub fn similar_users(
    user_id: UserId,
    user_similarity: &SimilarityMatrix,
    n: usize,
) -> Vec<(UserId, f64)> {
    let mut ranked = user_similarity.ranked_neighbors(user_id);
    ranked.truncate(n);
    ranked
}
