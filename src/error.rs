use crate::models::{ItemId, UserId};

/// Errors raised while bringing rating data into the engine.
#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid record for user {user_id}, item {item_id}: {reason}")]
    InvalidRecord {
        user_id: UserId,
        item_id: ItemId,
        reason: String,
    },

    #[error("Invalid generator settings: {0}")]
    InvalidGenerator(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type DataResult<T> = Result<T, DataError>;
