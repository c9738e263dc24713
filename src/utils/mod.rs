use crate::models::{ItemId, ItemMetadata, RatingRecord};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

pub mod validation;

/// Order-sensitive hash of the (user, item, rating) triples of a table.
///
/// Category and price are ignored; they never reach the matrices.
pub fn content_hash(records: &[RatingRecord]) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.len().hash(&mut hasher);
    for record in records {
        record.user_id.hash(&mut hasher);
        record.item_id.hash(&mut hasher);
        record.rating.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// First-seen category and price per item id.
pub fn extract_item_metadata(records: &[RatingRecord]) -> BTreeMap<ItemId, ItemMetadata> {
    let mut metadata = BTreeMap::new();
    for record in records {
        metadata.entry(record.item_id).or_insert_with(|| ItemMetadata {
            item_id: record.item_id,
            category: record.category.clone(),
            price: record.price,
        });
    }
    metadata
}
