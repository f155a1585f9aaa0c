pub mod api;
pub mod config;
pub mod error;
pub mod indexes;
mod product;
pub mod render;
pub mod timing;

pub use config::Config;
pub use error::{Error, LoadError, Result};
pub use indexes::{Backend, Hit, SyncReport};
pub use product::{load_catalog, Product, ProductId};
