use crate::error::DataError;
use crate::models::*;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub n: Option<usize>,
    pub min_rating_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
        }
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);
type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn data_error(err: DataError) -> ApiError {
    let status = match err {
        DataError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::warn!("Rejected request: {}", err);
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Runs CPU-bound matrix work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, DataError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(data_error),
        Err(e) => {
            tracing::error!("Blocking task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("internal error".to_string())),
            ))
        }
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "pivotrec".to_string());
    status.insert("version".to_string(), env!("CARGO_PKG_VERSION").to_string());

    Json(ApiResponse::success(status))
}

async fn get_dataset(State(state): State<AppState>) -> ApiResult<DatasetSummary> {
    let service = state.recommendation_service.clone();
    let summary = blocking(move || Ok(service.summary())).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn replace_ratings(
    State(state): State<AppState>,
    Json(records): Json<Vec<RatingRecord>>,
) -> ApiResult<DatasetSummary> {
    let service = state.recommendation_service.clone();
    let summary = blocking(move || service.replace_ratings(records)).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn upload_csv(State(state): State<AppState>, body: String) -> ApiResult<DatasetSummary> {
    let service = state.recommendation_service.clone();
    let summary = blocking(move || service.load_csv(body.as_bytes())).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn generate_ratings(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<DatasetSummary> {
    let service = state.recommendation_service.clone();
    let summary = blocking(move || service.generate(&request)).await?;
    Ok(Json(ApiResponse::success(summary)))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<RecommendationQuery>,
) -> ApiResult<RecommendationResponse> {
    let defaults = &state.config.recommendation;
    let request = RecommendationRequest {
        user_id,
        num_recommendations: params.n.unwrap_or(defaults.default_n),
        min_rating_threshold: params
            .min_rating_threshold
            .unwrap_or(defaults.min_rating_threshold),
    };

    let service = state.recommendation_service.clone();
    let response = blocking(move || service.recommend_for_user(&request)).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_similar_items(
    State(state): State<AppState>,
    Path(item_id): Path<ItemId>,
    Query(params): Query<SimilarQuery>,
) -> ApiResult<SimilarItemsResponse> {
    let n = params.n.unwrap_or(state.config.recommendation.default_n);

    let service = state.recommendation_service.clone();
    let response = blocking(move || service.similar_items(item_id, n)).await?;
    Ok(Json(ApiResponse::success(response)))
}

async fn get_user_similarity(State(state): State<AppState>) -> ApiResult<SimilarityMatrixResponse> {
    let service = state.recommendation_service.clone();
    let matrix = blocking(move || Ok(service.user_similarity_matrix())).await?;
    Ok(Json(ApiResponse::success(matrix)))
}

async fn get_item_similarity(State(state): State<AppState>) -> ApiResult<SimilarityMatrixResponse> {
    let service = state.recommendation_service.clone();
    let matrix = blocking(move || Ok(service.item_similarity_matrix())).await?;
    Ok(Json(ApiResponse::success(matrix)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/dataset", get(get_dataset))
        .route("/ratings", put(replace_ratings))
        .route("/ratings/csv", post(upload_csv))
        .route("/ratings/generate", post(generate_ratings))
        .route("/users/:user_id/recommendations", get(get_recommendations))
        .route("/items/:item_id/similar", get(get_similar_items))
        .route("/similarity/users", get(get_user_similarity))
        .route("/similarity/items", get(get_item_similarity))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
