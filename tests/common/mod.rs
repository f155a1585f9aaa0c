#![allow(dead_code)]

use big_s::S;
use productsearch::{Product, ProductId};

pub fn product(id: ProductId, name: &'static str, description: &'static str, price: f64) -> Product {
    Product {
        id,
        name: S(name),
        description: S(description),
        price,
    }
}

/// The two-product catalog the backends are compared on.
pub fn catalog() -> Vec<Product> {
    vec![
        product(1, "GPS Tracker", "tracking device", 1499.0),
        product(2, "Dumbbells", "dumbbell set", 999.0),
    ]
}

pub fn ids(products: impl IntoIterator<Item = Product>) -> Vec<ProductId> {
    products.into_iter().map(|product| product.id).collect()
}
