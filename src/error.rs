// src/error.rs
// Error taxonomy for the message pipeline.
//
// Only `InvalidSchedule` ever reaches a caller as a hard failure; everything
// else is contained at its own layer and degrades to fewer results.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Messages store is not accessible")]
    AccessDenied,

    #[error("Store query failed: {0}")]
    Store(String),

    #[error("Row shape mismatch: {0}")]
    RowShape(String),

    #[error("Cannot schedule a message in the past")]
    InvalidSchedule,

    #[error("Send failed: {0}")]
    Send(String),
}
