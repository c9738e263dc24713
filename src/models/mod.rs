use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ItemId = i64;

/// One row of the rating table. Field names follow the CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(rename = "User_ID")]
    pub user_id: UserId,
    #[serde(rename = "Item_ID")]
    pub item_id: ItemId,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "Price", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub item_id: ItemId,
    pub category: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    pub num_recommendations: usize,
    pub min_rating_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub recommendations: Vec<RecommendationItem>,
    pub dataset_version: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub item_id: ItemId,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarItemsResponse {
    pub item_id: ItemId,
    pub similar_items: Vec<RecommendationItem>,
    pub dataset_version: u64,
    pub generated_at: DateTime<Utc>,
}

/// Row-major similarity values with their id axis, for heatmap rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityMatrixResponse {
    pub ids: Vec<i64>,
    pub values: Vec<Vec<f64>>,
    pub dataset_version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub version: u64,
    pub content_hash: u64,
    pub records: usize,
    pub users: usize,
    pub items: usize,
    pub rated_cells: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub num_users: Option<usize>,
    pub num_items: Option<usize>,
    pub seed: Option<u64>,
}

impl RatingRecord {
    pub fn new(user_id: UserId, item_id: ItemId, rating: f64) -> Self {
        Self {
            user_id,
            item_id,
            rating,
            category: None,
            price: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

impl RecommendationItem {
    pub fn new(item_id: ItemId, metadata: Option<&ItemMetadata>) -> Self {
        Self {
            item_id,
            category: metadata.and_then(|m| m.category.clone()),
            price: metadata.and_then(|m| m.price),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}
