use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Client, Collection, IndexModel,
};
use serde::Deserialize;

use crate::{Product, ProductId, Result};

use super::{Backend, Hit, SyncReport};

const TEXT_INDEX: &str = "description_text";

/// Products stored in a MongoDB collection and searched through a text index.
#[derive(Clone, Debug)]
pub struct MongoDb {
    collection: Collection<Product>,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }

    /// Create the text index on `description`. Mongo treats an identical
    /// index as already present, so this can run on every start.
    async fn ensure_text_index(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "description": "text" })
            .options(IndexOptions::builder().name(TEXT_INDEX.to_string()).build())
            .build();
        self.collection.create_index(index, None).await?;
        Ok(())
    }

    fn raw(&self) -> Collection<Document> {
        self.collection.clone_with_type()
    }
}

#[async_trait]
impl Backend for MongoDb {
    fn name(&self) -> &'static str {
        "MongoDB"
    }

    /// Insert the catalog only when the collection is empty.
    ///
    /// The count and the insert are two requests, so two concurrent loads
    /// can both see an empty collection.
    async fn load(&self, products: &[Product]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let existing = self.collection.count_documents(None, None).await?;
        match plan_load(existing, products.len()) {
            LoadPlan::Insert => {
                let inserted = self.collection.insert_many(products, None).await?;
                report.written = inserted.inserted_ids.len();
                log::info!("Data inserted: {} products", report.written);
            }
            LoadPlan::AlreadyLoaded => {
                report.skipped = true;
                log::info!("collection already holds {existing} documents, nothing inserted");
            }
            LoadPlan::NothingToInsert => log::info!("empty catalog, nothing inserted"),
        }
        self.ensure_text_index().await?;
        Ok(report)
    }

    async fn get_documents(&self) -> Result<Vec<Product>> {
        let options = FindOptions::builder().sort(doc! { "id": 1 }).build();
        let products = self.collection.find(None, options).await?.try_collect().await?;
        Ok(products)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Hit>> {
        let filter = text_filter(keyword);
        log::debug!("mongodb query {filter}");
        let options = FindOptions::builder()
            .projection(doc! { "score": { "$meta": "textScore" } })
            .sort(doc! { "score": { "$meta": "textScore" } })
            .build();
        let documents: Vec<Document> = self.raw().find(filter, options).await?.try_collect().await?;
        documents
            .into_iter()
            .map(|document| -> Result<Hit> {
                Ok(mongodb::bson::from_document::<ScoredProduct>(document)?.into())
            })
            .collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LoadPlan {
    Insert,
    AlreadyLoaded,
    NothingToInsert,
}

/// The catalog is only inserted into an empty collection.
fn plan_load(existing: u64, incoming: usize) -> LoadPlan {
    if existing > 0 {
        LoadPlan::AlreadyLoaded
    } else if incoming == 0 {
        LoadPlan::NothingToInsert
    } else {
        LoadPlan::Insert
    }
}

fn text_filter(keyword: &str) -> Document {
    doc! { "$text": { "$search": keyword } }
}

/// A stored product as returned by a text search, with its `textScore`.
#[derive(Debug, Deserialize)]
struct ScoredProduct {
    id: ProductId,
    name: String,
    description: String,
    price: f64,
    #[serde(default)]
    score: Option<f64>,
}

impl From<ScoredProduct> for Hit {
    fn from(scored: ScoredProduct) -> Self {
        Hit {
            product: Product {
                id: scored.id,
                name: scored.name,
                description: scored.description,
                price: scored.price,
            },
            score: scored.score,
        }
    }
}
