use thiserror::Error;

use crate::store::StoreError;

/// Error returned by page loaders
///
/// `NotFound` becomes a 404; `Backend` propagates to a generic 500.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Backend(StoreError),
}

impl From<StoreError> for LoadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => Self::Backend(other),
        }
    }
}
