use thiserror::Error;

#[derive(Error, Debug)]
pub enum GachaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pool '{pool_id}' has no items")]
    EmptyPool { pool_id: String },

    #[error("Pool '{pool_id}' has no uncapped common item to absorb capped-out weight")]
    NoSinkItem { pool_id: String },

    #[error("Pool '{pool_id}' total weight must be positive and finite, got {total}")]
    NonPositiveTotalWeight { pool_id: String, total: f64 },

    #[error("Invalid item '{id}': {reason}")]
    InvalidItem { id: String, reason: String },

    #[error("Duplicate item id '{id}'")]
    DuplicateItem { id: String },

    #[error("No eligible items left in pool '{pool_id}'")]
    NoEligibleItems { pool_id: String },

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("No activity configured for pool '{pool_id}'")]
    PoolNotFound { pool_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GachaResult<T> = Result<T, GachaError>;
