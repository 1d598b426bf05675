//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{BuildError, CatalogError, HostError};

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Host(#[from] HostError),

    #[error("catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("invalid catalog: {0}")]
    InvalidCatalog(#[from] CatalogError),

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("declaration {}: {message}", path.display())]
    Declaration { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
