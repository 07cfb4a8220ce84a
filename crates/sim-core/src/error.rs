use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("External service failure: {0}")]
    ExternalServiceFailure(String),

    #[error("Insufficient funds: need \u{20b9}{needed}, have \u{20b9}{available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Corrupt save data: {0}")]
    CorruptSave(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type SimResult<T> = Result<T, SimError>;
