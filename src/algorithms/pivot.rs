use crate::models::{ItemId, RatingRecord, UserId};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

/// Dense user x item view of a rating table.
///
/// Rows follow `user_ids` and columns follow `item_ids`, both sorted
/// ascending. A cell is `None` when no record backs the pair; absent cells
/// only become zero inside the similarity computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotMatrix {
    user_ids: Vec<UserId>,
    item_ids: Vec<ItemId>,
    cells: Array2<Option<f64>>,
}

impl PivotMatrix {
    pub fn empty() -> Self {
        Self {
            user_ids: Vec::new(),
            item_ids: Vec::new(),
            cells: Array2::from_elem((0, 0), None),
        }
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.user_ids.len(), self.item_ids.len())
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() || self.item_ids.is_empty()
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_ids.binary_search(&user_id).ok()
    }

    pub fn item_position(&self, item_id: ItemId) -> Option<usize> {
        self.item_ids.binary_search(&item_id).ok()
    }

    pub fn get(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        let row = self.user_position(user_id)?;
        let col = self.item_position(item_id)?;
        self.cells[[row, col]]
    }

    /// Items the user has any rating for, in column order.
    pub fn rated_items(&self, user_id: UserId) -> Vec<ItemId> {
        match self.user_position(user_id) {
            Some(row) => self.row_entries(row).map(|(item_id, _)| item_id).collect(),
            None => Vec::new(),
        }
    }

    /// Non-absent `(item, rating)` pairs of a row, in column order.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.cells
            .row(row)
            .into_iter()
            .zip(self.item_ids.iter())
            .filter_map(|(&cell, &item_id)| cell.map(|rating| (item_id, rating)))
    }

    pub fn rating_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Absent cells replaced by zero.
    pub fn filled(&self) -> Array2<f64> {
        self.cells.mapv(|cell| cell.unwrap_or(0.0))
    }
}

impl Default for PivotMatrix {
    fn default() -> Self {
        Self::empty()
    }
}

/// Pivots ratings into a dense matrix, averaging duplicate (user, item) pairs.
pub fn build_pivot(ratings: &[RatingRecord]) -> PivotMatrix {
    let mut sums: BTreeMap<(UserId, ItemId), (f64, u32)> = BTreeMap::new();
    let mut users = BTreeSet::new();
    let mut items = BTreeSet::new();

    for record in ratings {
        users.insert(record.user_id);
        items.insert(record.item_id);
        let entry = sums.entry((record.user_id, record.item_id)).or_insert((0.0, 0));
        entry.0 += record.rating;
        entry.1 += 1;
    }

    let user_ids: Vec<UserId> = users.into_iter().collect();
    let item_ids: Vec<ItemId> = items.into_iter().collect();
    let mut cells = Array2::from_elem((user_ids.len(), item_ids.len()), None);

    for ((user_id, item_id), (sum, count)) in sums {
        if let (Ok(row), Ok(col)) = (user_ids.binary_search(&user_id), item_ids.binary_search(&item_id)) {
            cells[[row, col]] = Some(sum / f64::from(count));
        }
    }

    PivotMatrix {
        user_ids,
        item_ids,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: UserId, item_id: ItemId, rating: f64) -> RatingRecord {
        RatingRecord::new(user_id, item_id, rating)
    }

    #[test]
    fn test_axes_are_sorted_distinct_ids() {
        let ratings = vec![
            record(7, 30, 1.0),
            record(2, 10, 2.0),
            record(7, 10, 3.0),
            record(4, 20, 4.0),
        ];
        let pivot = build_pivot(&ratings);

        assert_eq!(pivot.user_ids(), &[2, 4, 7]);
        assert_eq!(pivot.item_ids(), &[10, 20, 30]);
        assert_eq!(pivot.shape(), (3, 3));
    }

    #[test]
    fn test_duplicates_are_averaged() {
        let pivot = build_pivot(&[record(1, 1, 2.0), record(1, 1, 4.0)]);
        assert_eq!(pivot.get(1, 1), Some(3.0));
        assert_eq!(pivot.rating_count(), 1);
    }

    #[test]
    fn test_missing_pairs_stay_absent() {
        let pivot = build_pivot(&[record(1, 10, 5.0), record(2, 20, 0.0)]);

        assert_eq!(pivot.get(1, 20), None);
        assert_eq!(pivot.get(2, 10), None);
        // A real zero rating is not the same as no rating.
        assert_eq!(pivot.get(2, 20), Some(0.0));
        assert_eq!(pivot.rated_items(2), vec![20]);

        let filled = pivot.filled();
        assert_eq!(filled[[0, 1]], 0.0);
        assert_eq!(filled[[0, 0]], 5.0);
    }

    #[test]
    fn test_empty_input() {
        let pivot = build_pivot(&[]);
        assert!(pivot.is_empty());
        assert_eq!(pivot.shape(), (0, 0));
        assert!(pivot.rated_items(1).is_empty());
        assert_eq!(pivot.filled().dim(), (0, 0));
    }
}
