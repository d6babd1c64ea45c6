pub mod booking;
pub mod notify;
pub mod payment;
pub mod repository;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not authorized: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
