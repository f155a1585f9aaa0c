use std::sync::Arc;

use anyhow::Context;
use productsearch::{api, indexes, load_catalog, render, timing, Backend, Config, Product};

const ENGINES: &str = "`elasticsearch`, `mongodb`, `sqlite`, `ui`";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "productsearch".to_string());
    let engine = args.next();
    let keywords: Vec<String> = args.collect();

    let engine = match engine.as_deref() {
        Some(engine @ ("elasticsearch" | "mongodb" | "sqlite" | "ui")) => engine,
        Some(engine) => {
            eprintln!("Unknown engine {engine}. Available engines are {ENGINES}.");
            std::process::exit(1);
        }
        None => {
            eprintln!("Usage:\n\t{program} <engine> [keyword...]\n\nengines: {ENGINES}");
            std::process::exit(1);
        }
    };

    let config = Config::from_env()?;
    let catalog = load_catalog(&config.catalog_path)?;

    match engine {
        "elasticsearch" => {
            let backend = indexes::Elasticsearch::new(
                &config.elasticsearch_url,
                &config.elasticsearch_index,
                config.elasticsearch_mode,
            );
            log::info!("elasticsearch queries use `{}` mode", backend.mode());
            search(&backend, &catalog, or_default(keywords, &["trak"])).await
        }
        "mongodb" => {
            let backend = indexes::MongoDb::connect(
                &config.mongodb_uri,
                &config.mongodb_database,
                &config.mongodb_collection,
            )
            .await
            .with_context(|| format!("connecting to {}", config.mongodb_uri))?;
            search(&backend, &catalog, or_default(keywords, &["track", "dumbel"])).await
        }
        "sqlite" => {
            let backend = indexes::SQLite::open(&config.sqlite_path).await?;
            search(&backend, &catalog, or_default(keywords, &["track", "trak"])).await
        }
        _ => {
            let backend = indexes::SQLite::open(&config.sqlite_path).await?;
            backend.load(&catalog).await?;
            api::run(Arc::new(backend), config.ui_bind).await?;
            Ok(())
        }
    }
}

/// Load the catalog into `backend` then run and print one timed search per keyword.
async fn search(backend: &dyn Backend, catalog: &[Product], keywords: Vec<String>) -> anyhow::Result<()> {
    let report = backend
        .load(catalog)
        .await
        .with_context(|| format!("loading the catalog into {}", backend.name()))?;
    if !report.failed.is_empty() {
        log::warn!(
            "{} products could not be loaded into {}: {:?}",
            report.failed.len(),
            backend.name(),
            report.failed
        );
    }

    for keyword in &keywords {
        let hits = timing::timed_search(backend, keyword)
            .await
            .with_context(|| format!("searching {} for {keyword:?}", backend.name()))?;
        println!("{}", render::console_report(backend.name(), keyword, &hits));
    }
    Ok(())
}

fn or_default(keywords: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if keywords.is_empty() {
        defaults.iter().map(|keyword| keyword.to_string()).collect()
    } else {
        keywords
    }
}
