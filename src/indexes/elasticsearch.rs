use std::{fmt, str::FromStr};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::Error, Product, Result};

use super::{Backend, Hit, SyncReport};

/// The largest result window Elasticsearch allows without scrolling.
const MAX_RESULT_WINDOW: usize = 10_000;

/// Which full-text query is sent for a keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// `match`: analyzed terms must match exactly.
    Match,
    /// `match_phrase_prefix`: the last term may be a prefix, "track" finds "tracking".
    PhrasePrefix,
    /// `match` with `fuzziness: AUTO`: tolerates typos, "trak" finds "track".
    #[default]
    Fuzzy,
}

impl SearchMode {
    pub fn query(self, keyword: &str) -> Value {
        match self {
            SearchMode::Match => json!({
                "query": { "match": { "description": keyword } }
            }),
            SearchMode::PhrasePrefix => json!({
                "query": { "match_phrase_prefix": { "description": keyword } }
            }),
            SearchMode::Fuzzy => json!({
                "query": {
                    "match": {
                        "description": { "query": keyword, "fuzziness": "AUTO" }
                    }
                }
            }),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "match" => Ok(SearchMode::Match),
            "phrase_prefix" | "match_phrase_prefix" => Ok(SearchMode::PhrasePrefix),
            "fuzzy" => Ok(SearchMode::Fuzzy),
            other => Err(format!(
                "unknown search mode `{other}`, expected `match`, `phrase_prefix` or `fuzzy`"
            )),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchMode::Match => "match",
            SearchMode::PhrasePrefix => "phrase_prefix",
            SearchMode::Fuzzy => "fuzzy",
        })
    }
}

/// Products indexed in a remote Elasticsearch node over its REST API.
#[derive(Clone, Debug)]
pub struct Elasticsearch {
    client: Client,
    url: String,
    index: String,
    mode: SearchMode,
}

impl Elasticsearch {
    pub fn new(url: impl Into<String>, index: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            client: Client::new(),
            url: url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            mode,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.url, self.index, path)
    }

    async fn put_document(&self, product: &Product) -> Result<()> {
        let response = self
            .client
            .put(self.endpoint(&format!("_doc/{}", product.id)))
            .json(product)
            .send()
            .await?;
        let status = response.status();
        if is_indexed(status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Elasticsearch { status, body })
    }

    async fn refresh(&self) -> Result<()> {
        let response = self.client.post(self.endpoint("_refresh")).send().await?;
        ensure_success(response).await.map(drop)
    }

    async fn query(&self, body: &Value) -> Result<Vec<Hit>> {
        log::debug!("elasticsearch query {body}");
        let response = self
            .client
            .post(self.endpoint("_search"))
            .json(body)
            .send()
            .await?;
        let response: SearchResponse = ensure_success(response).await?.json().await?;
        Ok(response.into_hits())
    }
}

#[async_trait]
impl Backend for Elasticsearch {
    fn name(&self) -> &'static str {
        "Elasticsearch"
    }

    /// One request per product. A rejected product is logged and skipped;
    /// an unreachable node aborts the load.
    async fn load(&self, products: &[Product]) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for product in products {
            match self.put_document(product).await {
                Ok(()) => report.written += 1,
                Err(Error::Elasticsearch { status, body }) => {
                    log::warn!("Failed to index {}: {status} {body}", product.id);
                    report.failed.push(product.id);
                }
                Err(err) => return Err(err),
            }
        }
        self.refresh().await?;
        log::info!(
            "{} products indexed in `{}`, {} failed",
            report.written,
            self.index,
            report.failed.len()
        );
        Ok(report)
    }

    async fn get_documents(&self) -> Result<Vec<Product>> {
        let body = json!({
            "query": { "match_all": {} },
            "size": MAX_RESULT_WINDOW,
            "sort": [{ "id": "asc" }],
        });
        let hits = self.query(&body).await?;
        Ok(hits.into_iter().map(|hit| hit.product).collect())
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Hit>> {
        self.query(&self.mode.query(keyword)).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Elasticsearch { status, body })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_source")]
    source: Product,
    #[serde(rename = "_score")]
    score: Option<f64>,
}

impl SearchResponse {
    fn into_hits(self) -> Vec<Hit> {
        self.hits
            .hits
            .into_iter()
            .map(|hit| Hit {
                product: hit.source,
                score: hit.score,
            })
            .collect()
    }
}

/// Whether the node answered a document write as created or updated.
pub fn is_indexed(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED)
}
