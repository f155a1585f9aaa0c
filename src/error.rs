use std::path::PathBuf;

use crate::ProductId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid configuration for `{key}`: {reason}")]
    Config { key: &'static str, reason: String },

    #[error("elasticsearch request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("elasticsearch answered {status}: {body}")]
    Elasticsearch {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("mongodb operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("stored document is not a product: {0}")]
    Bson(#[from] mongodb::bson::de::Error),

    #[error("sqlite operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("search form server failed: {0}")]
    Server(Box<dyn std::error::Error + Send + Sync>),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Reasons a catalog file can't be turned into products.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("can't read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("catalog {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("catalog {} contains product {id} more than once", path.display())]
    DuplicateId { path: PathBuf, id: ProductId },
}
