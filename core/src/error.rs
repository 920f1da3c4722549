use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Investment '{id}' not found")]
    InvestmentNotFound { id: String },

    #[error("Customer '{username}' not found")]
    CustomerNotFound { username: String },

    #[error("Invalid input: {what}")]
    InvalidInput { what: String },

    #[error("Investment '{id}' is '{status}' and cannot be decided again")]
    InvalidStateTransition { id: String, status: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
