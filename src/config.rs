use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use crate::{error::Error, indexes::elasticsearch::SearchMode, Result};

/// Where the catalog lives and how to reach every backend.
///
/// Every value comes from an environment variable and falls back to the
/// local default the demo services listen on.
#[derive(Clone, Debug)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    pub elasticsearch_mode: SearchMode,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub mongodb_collection: String,
    pub sqlite_path: PathBuf,
    pub ui_bind: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source; `from_env` plugs in the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            catalog_path: var("CATALOG_PATH", "data/products.json").into(),
            elasticsearch_url: var("ELASTICSEARCH_URL", "http://localhost:9200")
                .trim_end_matches('/')
                .to_string(),
            elasticsearch_index: var("ELASTICSEARCH_INDEX", "products"),
            elasticsearch_mode: parse("ELASTICSEARCH_MODE", &var("ELASTICSEARCH_MODE", "fuzzy"))?,
            mongodb_uri: var("MONGODB_URI", "mongodb://localhost:27017/"),
            mongodb_database: var("MONGODB_DATABASE", "test"),
            mongodb_collection: var("MONGODB_COLLECTION", "products"),
            sqlite_path: var("SQLITE_PATH", "products.db").into(),
            ui_bind: parse("UI_BIND", &var("UI_BIND", "127.0.0.1:3000"))?,
        })
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| Error::Config {
        key,
        reason: format!("{value:?}: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use big_s::S;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_local_services() {
        let config = config(&[]).unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("data/products.json"));
        assert_eq!(config.elasticsearch_url, "http://localhost:9200");
        assert_eq!(config.elasticsearch_index, "products");
        assert_eq!(config.elasticsearch_mode, SearchMode::Fuzzy);
        assert_eq!(config.mongodb_uri, "mongodb://localhost:27017/");
        assert_eq!(config.mongodb_database, "test");
        assert_eq!(config.mongodb_collection, "products");
        assert_eq!(config.sqlite_path, PathBuf::from("products.db"));
        assert_eq!(config.ui_bind, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn variables_override_defaults() {
        let config = config(&[
            ("ELASTICSEARCH_URL", "http://search:9200/"),
            ("ELASTICSEARCH_MODE", "phrase_prefix"),
            ("SQLITE_PATH", "/tmp/catalog.db"),
            ("UI_BIND", "0.0.0.0:8080"),
        ])
        .unwrap();
        assert_eq!(config.elasticsearch_url, S("http://search:9200"));
        assert_eq!(config.elasticsearch_mode, SearchMode::PhrasePrefix);
        assert_eq!(config.sqlite_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.ui_bind.port(), 8080);
    }

    #[test]
    fn blank_variables_fall_back_to_defaults() {
        let config = config(&[("MONGODB_DATABASE", "  ")]).unwrap();
        assert_eq!(config.mongodb_database, "test");
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = config(&[("UI_BIND", "not an address")]).unwrap_err();
        assert!(matches!(err, Error::Config { key: "UI_BIND", .. }));

        let err = config(&[("ELASTICSEARCH_MODE", "semantic")]).unwrap_err();
        assert!(matches!(err, Error::Config { key: "ELASTICSEARCH_MODE", .. }));
    }
}
