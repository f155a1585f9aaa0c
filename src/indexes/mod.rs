pub mod elasticsearch;
pub mod mongo;
pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;

use crate::{Product, ProductId, Result};

pub use self::elasticsearch::Elasticsearch;
pub use self::mongo::MongoDb;
pub use self::sqlite::SQLite;

/// One product returned by a search.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hit {
    pub product: Product,
    /// Relevance computed by the engine, when it computes one.
    pub score: Option<f64>,
}

impl Hit {
    pub fn unscored(product: Product) -> Self {
        Self {
            product,
            score: None,
        }
    }
}

/// What happened while loading a catalog into a backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub written: usize,
    /// Products the backend refused; the others were still written.
    pub failed: Vec<ProductId>,
    /// The backend already held data and nothing was written.
    pub skipped: bool,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Human readable name used in reports
    fn name(&self) -> &'static str;

    /// Make the catalog searchable
    async fn load(&self, products: &[Product]) -> Result<SyncReport>;

    /// Every stored product, ordered by id
    async fn get_documents(&self) -> Result<Vec<Product>>;

    /// Products whose description matches `keyword`, in the order the engine ranks them
    async fn search(&self, keyword: &str) -> Result<Vec<Hit>>;
}
