use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

pub type ProductId = i64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// The only field the backends search in.
    pub description: String,
    pub price: f64,
}

/// Read the whole catalog from `path`.
///
/// Either every product is returned or none: a missing file, a record with
/// a missing or mistyped field, or two records sharing an id all fail with
/// a [`LoadError`].
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Product>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(BufReader::new(file), path)
}

pub(crate) fn parse_catalog(
    reader: impl std::io::Read,
    path: &Path,
) -> Result<Vec<Product>, LoadError> {
    // A catalog file holds either a single product or a list of them.
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    let products: Vec<Product> = match value {
        serde_json::Value::Object(_) => {
            vec![
                serde_json::from_value(value).map_err(|source| LoadError::Malformed {
                    path: path.to_path_buf(),
                    source,
                })?,
            ]
        }
        value => serde_json::from_value(value).map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?,
    };

    let mut seen = HashSet::with_capacity(products.len());
    if let Some(product) = products.iter().find(|product| !seen.insert(product.id)) {
        return Err(LoadError::DuplicateId {
            path: path.to_path_buf(),
            id: product.id,
        });
    }

    log::debug!("loaded {} products from {}", products.len(), path.display());
    Ok(products)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(json: &str) -> Result<Vec<Product>, LoadError> {
        parse_catalog(json.as_bytes(), &PathBuf::from("products.json"))
    }

    #[test]
    fn loads_every_record() {
        let products = parse(
            r#"[
                {"id": 1, "name": "GPS Tracker", "description": "tracking device", "price": 1499.0},
                {"id": 2, "name": "Dumbbells", "description": "dumbbell set", "price": 999.5}
            ]"#,
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            Product {
                id: 1,
                name: "GPS Tracker".into(),
                description: "tracking device".into(),
                price: 1499.0,
            }
        );
        assert_eq!(products[1].price, 999.5);
    }

    #[test]
    fn integer_prices_are_accepted() {
        let products =
            parse(r#"[{"id": 3, "name": "Mat", "description": "yoga mat", "price": 700}]"#)
                .unwrap();
        assert_eq!(products[0].price, 700.0);
    }

    #[test]
    fn single_object_is_a_catalog_of_one() {
        let products =
            parse(r#"{"id": 7, "name": "Rope", "description": "skipping rope", "price": 10}"#)
                .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, 7);
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = parse(r#"[{"id": 1, "name": "GPS Tracker", "price": 1499.0}]"#).unwrap_err();
        match err {
            LoadError::Malformed { source, .. } => {
                assert!(source.to_string().contains("description"), "{source}")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_malformed() {
        let err = parse(r#"[{"id": "one", "name": "a", "description": "b", "price": 1}]"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(parse("[{"), Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = parse(
            r#"[
                {"id": 1, "name": "a", "description": "x", "price": 1},
                {"id": 1, "name": "b", "description": "y", "price": 2}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateId { id: 1, .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_catalog("this/file/does/not/exist.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
