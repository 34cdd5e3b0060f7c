use thiserror::Error;

/// Error taxonomy shared by every service operation.
///
/// Domain outcomes (`NotFound`, `Forbidden`, `Validation`) carry a
/// user-facing message; `Internal` wraps unexpected failures such as
/// database errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
