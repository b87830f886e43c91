use std::sync::Arc;

use vitrina::{
    OrderedItem, Payload, Scope,
    backend::{Backend, database::InMemory},
    order::NewItem,
};

/// Creates a test backend based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/vitrina_test" \
///   cargo test --features postgres
/// ```
pub async fn test_backend() -> Arc<dyn Backend> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use vitrina::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use vitrina::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/vitrina_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// Adds `count` featured products (product ids 101, 102, ...) in append order.
pub async fn seed_products(backend: &dyn Backend, count: i64) -> Vec<OrderedItem> {
    let mut created = Vec::new();
    for i in 1..=count {
        let item = backend
            .create_item(Scope::Products, NewItem::new(Payload::product(100 + i)))
            .await
            .expect("Failed to create product");
        created.push(item);
    }
    created
}

/// Adds `count` carousel slides in append order.
pub async fn seed_slides(backend: &dyn Backend, count: i64) -> Vec<OrderedItem> {
    let mut created = Vec::new();
    for i in 1..=count {
        let image = format!("slide-{i}.jpg");
        let item = backend
            .create_item(
                Scope::Carousel,
                NewItem::new(Payload::slide(format!("Slide {i}"), Some(&image), None)),
            )
            .await
            .expect("Failed to create slide");
        created.push(item);
    }
    created
}

/// `(id, order)` pairs, the shape most assertions compare.
pub fn pairs(items: &[OrderedItem]) -> Vec<(i64, u32)> {
    items.iter().map(|i| (i.id.get(), i.order)).collect()
}

/// Orders only, in collection sequence.
pub fn orders(items: &[OrderedItem]) -> Vec<u32> {
    items.iter().map(|i| i.order).collect()
}
