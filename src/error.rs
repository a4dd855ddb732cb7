use crate::TransactionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("{0}")]
    Custom(String),
}
