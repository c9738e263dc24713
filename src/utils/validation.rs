use crate::error::DataError;
use crate::models::*;

pub fn validate_rating_record(record: &RatingRecord) -> Result<(), DataError> {
    if !record.rating.is_finite() {
        return Err(DataError::InvalidRecord {
            user_id: record.user_id,
            item_id: record.item_id,
            reason: "rating must be a finite number".to_string(),
        });
    }

    if let Some(price) = record.price {
        if !price.is_finite() || price < 0.0 {
            return Err(DataError::InvalidRecord {
                user_id: record.user_id,
                item_id: record.item_id,
                reason: format!("price must be a non-negative number, got {}", price),
            });
        }
    }

    Ok(())
}

pub fn validate_rating_records(records: &[RatingRecord]) -> Result<(), DataError> {
    records.iter().try_for_each(validate_rating_record)
}

pub fn validate_recommendation_request(request: &RecommendationRequest, max_n: usize) -> Result<(), DataError> {
    if request.num_recommendations == 0 {
        return Err(DataError::InvalidRequest(
            "num_recommendations must be at least 1".to_string(),
        ));
    }

    if request.num_recommendations > max_n {
        return Err(DataError::InvalidRequest(format!(
            "num_recommendations must be at most {}",
            max_n
        )));
    }

    if !request.min_rating_threshold.is_finite() {
        return Err(DataError::InvalidRequest(
            "min_rating_threshold must be a finite number".to_string(),
        ));
    }

    Ok(())
}
