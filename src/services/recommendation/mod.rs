use crate::algorithms::{CollaborativeFilter, Recommender, SimilarityMatrix};
use crate::config::Config;
use crate::error::DataError;
use crate::models::*;
use crate::services::data;
use crate::utils::{content_hash, extract_item_metadata, validation};
use anyhow::Result;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Built models keyed by the content hash of the table they came from.
///
/// Holds at most `capacity` models; the oldest insertion is evicted first.
pub struct ModelCache {
    models: DashMap<u64, Arc<CollaborativeFilter>>,
    insertion_order: Mutex<VecDeque<u64>>,
    capacity: usize,
}

impl ModelCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            models: DashMap::new(),
            insertion_order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: u64) -> Option<Arc<CollaborativeFilter>> {
        self.models.get(&key).map(|entry| entry.value().clone())
    }

    pub fn get_or_build<F>(&self, key: u64, build: F) -> Arc<CollaborativeFilter>
    where
        F: FnOnce() -> CollaborativeFilter,
    {
        if let Some(model) = self.get(key) {
            debug!(key, "Model cache hit");
            return model;
        }

        debug!(key, "Model cache miss");
        let model = Arc::new(build());
        self.insert(key, model.clone());
        model
    }

    fn insert(&self, key: u64, model: Arc<CollaborativeFilter>) {
        let mut order = self.insertion_order.lock();
        if self.models.insert(key, model).is_none() {
            order.push_back(key);
        }
        while order.len() > self.capacity {
            if let Some(evicted) = order.pop_front() {
                self.models.remove(&evicted);
                debug!(key = evicted, "Evicted model from cache");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Clone)]
struct Dataset {
    version: u64,
    hash: u64,
    records: Arc<Vec<RatingRecord>>,
    metadata: Arc<BTreeMap<ItemId, ItemMetadata>>,
}

/// Owns the current rating table and memoises the matrices built from it.
///
/// The matrices themselves come from the pure functions in `algorithms`;
/// this service only decides when to rebuild them.
pub struct RecommendationService {
    config: Arc<Config>,
    dataset: RwLock<Dataset>,
    cache: ModelCache,
}

impl RecommendationService {
    pub fn new(config: Arc<Config>) -> Self {
        let cache = ModelCache::new(config.cache.capacity);
        Self {
            config,
            dataset: RwLock::new(Dataset {
                version: 0,
                hash: content_hash(&[]),
                records: Arc::new(Vec::new()),
                metadata: Arc::new(BTreeMap::new()),
            }),
            cache,
        }
    }

    /// Starts from a synthetic table built with the configured generator.
    pub fn with_generated_data(config: Arc<Config>) -> Result<Self> {
        let service = Self::new(config.clone());
        let records = data::generate_synthetic_ratings(&config.generator)?;
        service.replace_ratings(records)?;
        Ok(service)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Swaps in a new rating table and bumps the dataset version.
    pub fn replace_ratings(&self, records: Vec<RatingRecord>) -> Result<DatasetSummary, DataError> {
        validation::validate_rating_records(&records)?;

        let hash = content_hash(&records);
        let metadata = extract_item_metadata(&records);
        let snapshot = {
            let mut dataset = self.dataset.write();
            dataset.version += 1;
            dataset.hash = hash;
            dataset.records = Arc::new(records);
            dataset.metadata = Arc::new(metadata);
            dataset.clone()
        };

        let summary = self.summary_of(&snapshot);
        info!(
            version = summary.version,
            records = summary.records,
            users = summary.users,
            items = summary.items,
            "Replaced rating table"
        );
        Ok(summary)
    }

    pub fn load_csv<R: std::io::Read>(&self, reader: R) -> Result<DatasetSummary, DataError> {
        let records = data::load_csv(reader)?;
        self.replace_ratings(records)
    }

    /// Regenerates the table; unset fields fall back to the configured generator.
    pub fn generate(&self, request: &GenerateRequest) -> Result<DatasetSummary, DataError> {
        let mut generator = self.config.generator.clone();
        if let Some(num_users) = request.num_users {
            generator.num_users = num_users;
        }
        if let Some(num_items) = request.num_items {
            generator.num_items = num_items;
        }
        if request.seed.is_some() {
            generator.seed = request.seed;
        }

        let records = data::generate_synthetic_ratings(&generator)?;
        self.replace_ratings(records)
    }

    pub fn records(&self) -> Arc<Vec<RatingRecord>> {
        self.dataset.read().records.clone()
    }

    pub fn version(&self) -> u64 {
        self.dataset.read().version
    }

    /// The model for the current table, built on first use.
    pub fn model(&self) -> Arc<CollaborativeFilter> {
        self.model_for(&self.snapshot())
    }

    pub fn summary(&self) -> DatasetSummary {
        self.summary_of(&self.snapshot())
    }

    pub fn recommend_for_user(&self, request: &RecommendationRequest) -> Result<RecommendationResponse, DataError> {
        validation::validate_recommendation_request(request, self.config.recommendation.max_n)?;

        let dataset = self.snapshot();
        let model = self.model_for(&dataset);
        let item_ids = model.recommend_for_user(
            request.user_id,
            request.num_recommendations,
            request.min_rating_threshold,
        );

        debug!(
            user_id = request.user_id,
            returned = item_ids.len(),
            "Computed user-based recommendations"
        );

        Ok(RecommendationResponse {
            user_id: request.user_id,
            recommendations: item_ids
                .into_iter()
                .map(|item_id| RecommendationItem::new(item_id, dataset.metadata.get(&item_id)))
                .collect(),
            dataset_version: dataset.version,
            generated_at: Utc::now(),
        })
    }

    pub fn similar_items(&self, item_id: ItemId, n: usize) -> Result<SimilarItemsResponse, DataError> {
        if n == 0 || n > self.config.recommendation.max_n {
            return Err(DataError::InvalidRequest(format!(
                "n must be between 1 and {}",
                self.config.recommendation.max_n
            )));
        }

        let dataset = self.snapshot();
        let model = self.model_for(&dataset);
        let similar_items = model
            .similar_items_scored(item_id, n)
            .into_iter()
            .map(|(id, score)| RecommendationItem::new(id, dataset.metadata.get(&id)).with_score(score))
            .collect();

        Ok(SimilarItemsResponse {
            item_id,
            similar_items,
            dataset_version: dataset.version,
            generated_at: Utc::now(),
        })
    }

    pub fn user_similarity_matrix(&self) -> SimilarityMatrixResponse {
        let dataset = self.snapshot();
        let model = self.model_for(&dataset);
        matrix_response(&model.user_similarity, dataset.version)
    }

    pub fn item_similarity_matrix(&self) -> SimilarityMatrixResponse {
        let dataset = self.snapshot();
        let model = self.model_for(&dataset);
        matrix_response(&model.item_similarity, dataset.version)
    }

    pub fn cached_models(&self) -> usize {
        self.cache.len()
    }

    /// Everything a response needs, read under one lock.
    fn snapshot(&self) -> Dataset {
        self.dataset.read().clone()
    }

    fn model_for(&self, dataset: &Dataset) -> Arc<CollaborativeFilter> {
        self.cache.get_or_build(dataset.hash, || {
            let start = Instant::now();
            let model = CollaborativeFilter::fit(&dataset.records);
            let (users, items) = model.pivot.shape();
            info!(
                users,
                items,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Built similarity matrices"
            );
            model
        })
    }

    fn summary_of(&self, dataset: &Dataset) -> DatasetSummary {
        let model = self.model_for(dataset);
        let (users, items) = model.pivot.shape();

        DatasetSummary {
            version: dataset.version,
            content_hash: dataset.hash,
            records: dataset.records.len(),
            users,
            items,
            rated_cells: model.pivot.rating_count(),
        }
    }
}

fn matrix_response(matrix: &SimilarityMatrix, version: u64) -> SimilarityMatrixResponse {
    SimilarityMatrixResponse {
        ids: matrix.ids().to_vec(),
        values: matrix
            .values()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect(),
        dataset_version: version,
    }
}
