//! Tests against running Elasticsearch and MongoDB nodes.
//!
//! Run with `cargo test -- --ignored`; endpoints come from the same
//! environment variables as the binary. The insert-only-when-empty
//! decision of the MongoDB load is also unit tested offline next to the
//! backend; here it is checked against a real collection.

mod common;

use common::{catalog, ids, product};
use productsearch::{
    indexes::{elasticsearch::SearchMode, Elasticsearch, MongoDb, SQLite},
    Backend, Config,
};

fn unique(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{name}_{nanos}")
}

#[tokio::test]
#[ignore]
async fn fuzzy_search_finds_typos_that_like_misses() {
    let config = Config::from_env().unwrap();
    // `fuzziness: AUTO` allows one edit for a four letter term: "trak" reaches
    // the token "track" but not "tracking".
    let catalog = vec![
        product(1, "GPS Tracker", "live track tracking device", 1499.0),
        product(2, "Dumbbells", "dumbbell set", 999.0),
    ];

    let elasticsearch =
        Elasticsearch::new(&config.elasticsearch_url, unique("products"), SearchMode::Fuzzy);
    let report = elasticsearch.load(&catalog).await.unwrap();
    assert_eq!(report.written, 2);
    let hits = elasticsearch.search("trak").await.unwrap();
    assert_eq!(ids(hits.iter().map(|hit| hit.product.clone())), vec![1]);
    assert!(hits[0].score.is_some());

    let dir = tempfile::tempdir().unwrap();
    let sqlite = SQLite::open(dir.path().join("products.db")).await.unwrap();
    sqlite.load(&catalog).await.unwrap();
    assert_eq!(ids(sqlite.search("track").await.unwrap().into_iter().map(|hit| hit.product)), vec![1]);
    assert!(sqlite.search("trak").await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn elasticsearch_modes() {
    let config = Config::from_env().unwrap();
    let index = unique("products");

    let strict = Elasticsearch::new(&config.elasticsearch_url, &index, SearchMode::Match);
    strict.load(&catalog()).await.unwrap();
    assert!(strict.search("track").await.unwrap().is_empty());

    let prefix = Elasticsearch::new(&config.elasticsearch_url, &index, SearchMode::PhrasePrefix);
    let hits = prefix.search("track").await.unwrap();
    assert_eq!(ids(hits.into_iter().map(|hit| hit.product)), vec![1]);

    assert_eq!(ids(prefix.get_documents().await.unwrap()), vec![1, 2]);
}

#[tokio::test]
#[ignore]
async fn mongodb_load_is_guarded_by_count() {
    let config = Config::from_env().unwrap();
    let mongo = MongoDb::connect(&config.mongodb_uri, &config.mongodb_database, &unique("products"))
        .await
        .unwrap();

    let first = mongo.load(&catalog()).await.unwrap();
    assert_eq!(first.written, 2);
    assert!(!first.skipped);

    let second = mongo.load(&catalog()).await.unwrap();
    assert_eq!(second.written, 0);
    assert!(second.skipped);
    assert_eq!(mongo.get_documents().await.unwrap().len(), 2);

    let hits = mongo.search("dumbbell").await.unwrap();
    assert_eq!(ids(hits.iter().map(|hit| hit.product.clone())), vec![2]);
    assert!(hits[0].score.is_some());
    // the text index stems words but does not tolerate typos
    assert!(mongo.search("dumbel").await.unwrap().is_empty());
}
