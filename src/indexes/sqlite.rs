use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use rusqlite::{params, Connection, Row};

use crate::{Product, ProductId, Result};

use super::{Backend, Hit, SyncReport};

/// Schema steps, applied in order. `PRAGMA user_version` records how many already ran.
const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price REAL NOT NULL
    );
    "#];

/// Products stored in an embedded SQLite file and searched with `LIKE`.
///
/// Nothing is kept open between calls: every operation opens its own
/// connection on a blocking worker and closes it when done.
#[derive(Clone, Debug)]
pub struct SQLite {
    path: PathBuf,
}

impl SQLite {
    /// Open (or create) the database at `path` and bring its schema up to date.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let backend = Self { path: path.into() };
        backend.with_connection(migrate).await?;
        Ok(backend)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = Connection::open(&path)?;
            f(&mut connection)
        })
        .await?
    }
}

#[async_trait]
impl Backend for SQLite {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    async fn load(&self, products: &[Product]) -> Result<SyncReport> {
        let products = products.to_vec();
        let written = self
            .with_connection(move |connection| sync_products(connection, &products))
            .await?;
        log::info!("{} products written to {}", written, self.path.display());
        Ok(SyncReport {
            written,
            ..SyncReport::default()
        })
    }

    async fn get_documents(&self) -> Result<Vec<Product>> {
        self.with_connection(|connection| all_products(connection))
            .await
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Hit>> {
        let keyword = keyword.to_string();
        let products = self
            .with_connection(move |connection| search_products(connection, &keyword))
            .await?;
        Ok(products.into_iter().map(Hit::unscored).collect())
    }
}

/// Apply the migrations this database hasn't seen yet.
pub fn migrate(connection: &mut Connection) -> Result<()> {
    let version: i64 = connection.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let target = MIGRATIONS.len() as i64;
    if version >= target {
        return Ok(());
    }

    let tx = connection.transaction()?;
    for migration in MIGRATIONS.iter().skip(version as usize) {
        tx.execute_batch(migration)?;
    }
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;
    log::debug!("sqlite schema migrated from version {version} to {target}");
    Ok(())
}

/// Make the table hold exactly `products`.
///
/// Existing rows are updated in place and rows whose id left the catalog
/// are deleted, all in one transaction. Returns the number of upserted rows.
pub fn sync_products(connection: &mut Connection, products: &[Product]) -> Result<usize> {
    let tx = connection.transaction()?;
    let mut written = 0;
    {
        let mut upsert = tx.prepare(
            r#"
            INSERT INTO products (id, name, description, price) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                price = excluded.price;
            "#,
        )?;
        for product in products {
            written += upsert.execute(params![
                product.id,
                product.name,
                product.description,
                product.price
            ])?;
        }

        let catalog: HashSet<ProductId> = products.iter().map(|product| product.id).collect();
        let stale: Vec<ProductId> = tx
            .prepare("SELECT id FROM products;")?
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<ProductId>>>()?
            .into_iter()
            .filter(|id| !catalog.contains(id))
            .collect();

        let mut delete = tx.prepare("DELETE FROM products WHERE id = ?1;")?;
        for id in &stale {
            delete.execute(params![id])?;
        }
        if !stale.is_empty() {
            log::info!("removed {} products no longer in the catalog", stale.len());
        }
    }
    tx.commit()?;
    Ok(written)
}

/// Products whose description contains `keyword`, matched with `LIKE`.
///
/// `%` and `_` in the keyword are literal. The empty keyword matches every row.
pub fn search_products(connection: &Connection, keyword: &str) -> Result<Vec<Product>> {
    let pattern = format!("%{}%", escape_like(keyword));
    log::debug!("sqlite search with pattern {pattern:?}");
    let mut statement = connection.prepare_cached(
        r#"
        SELECT id, name, description, price FROM products
        WHERE description LIKE ?1 ESCAPE '\'
        ORDER BY id;
        "#,
    )?;
    let products = statement
        .query_map(params![pattern], product_from_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(products)
}

pub fn all_products(connection: &Connection) -> Result<Vec<Product>> {
    let mut statement = connection
        .prepare_cached("SELECT id, name, description, price FROM products ORDER BY id;")?;
    let products = statement
        .query_map([], product_from_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(products)
}

fn product_from_row(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
    })
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
