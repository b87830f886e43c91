//! Relational storage for both homepage collections.
//!
//! One `home_items` table holds slides and featured products side by side,
//! keyed by scope. SQLite and PostgreSQL share every query through sqlx's
//! `AnyPool`; the few dialect differences are switched on [`DbKind`].
//!
//! The schema is created on connect, see [`schema`].

mod storage;

pub mod schema;

use std::any::Any;
#[cfg(feature = "postgres")]
use std::time::Duration;

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Executor};

use crate::Result;
use crate::backend::{Backend, BackendError, OrderStore};
use crate::order::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Scope};

/// Attaches a context message to sqlx errors, turning them into [`BackendError::SqlxError`].
pub(crate) trait SqlxResultExt<T> {
    fn sql_context(self, context: &str) -> Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn sql_context(self, context: &str) -> Result<T> {
        self.map_err(|e| {
            BackendError::SqlxError {
                reason: format!("{context}: {e}"),
                source: Some(e),
            }
            .into()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Sqlite,
    Postgres,
}

/// [`Backend`] over a SQL database.
pub struct SqlxBackend {
    pool: AnyPool,
    kind: DbKind,
}

impl SqlxBackend {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn kind(&self) -> DbKind {
        self.kind
    }

    pub fn is_sqlite(&self) -> bool {
        self.kind == DbKind::Sqlite
    }

    pub fn is_postgres(&self) -> bool {
        self.kind == DbKind::Postgres
    }
}

#[cfg(feature = "sqlite")]
impl SqlxBackend {
    /// Open (or create) the SQLite file at `path`.
    pub async fn open_sqlite<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect_sqlite(&url).await
    }

    /// Connect with a sqlx SQLite URL such as `sqlite:./vitrina.db`.
    pub async fn connect_sqlite(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let is_in_memory = url.contains("mode=memory");
        let mut options = AnyPoolOptions::new().max_connections(5);
        if is_in_memory {
            // The shared in-memory database dies with its last connection
            options = options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        // Pragmas are per connection, so they run on every one the pool opens
        let pool = options
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute("PRAGMA busy_timeout = 5000").await?;
                    if !is_in_memory {
                        conn.execute("PRAGMA journal_mode = WAL").await?;
                        conn.execute("PRAGMA synchronous = NORMAL").await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to SQLite")?;

        let backend = Self {
            pool,
            kind: DbKind::Sqlite,
        };
        schema::initialize(&backend).await?;
        Ok(backend)
    }

    /// A private in-memory database, gone when the backend is dropped.
    pub async fn sqlite_in_memory() -> Result<Self> {
        let url = format!(
            "sqlite:file:mem_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        Self::connect_sqlite(&url).await
    }
}

#[cfg(feature = "postgres")]
impl SqlxBackend {
    /// Connect to PostgreSQL, using the server's default search path.
    pub async fn connect_postgres(url: &str) -> Result<Self> {
        Self::connect_postgres_with_schema(url, None).await
    }

    async fn connect_postgres_with_schema(url: &str, schema_name: Option<String>) -> Result<Self> {
        sqlx::any::install_default_drivers();

        if let Some(schema) = &schema_name {
            let setup = AnyPoolOptions::new()
                .max_connections(1)
                .connect(url)
                .await
                .sql_context("Failed to connect to PostgreSQL")?;
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
                .execute(&setup)
                .await
                .sql_context(&format!("Failed to create schema {schema}"))?;
            setup.close().await;
        }

        let options = match schema_name {
            Some(_) => AnyPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(Duration::from_secs(30)),
            None => AnyPoolOptions::new().max_connections(5),
        };

        let pool = options
            .after_connect(move |conn, _meta| {
                let schema = schema_name.clone();
                Box::pin(async move {
                    if let Some(s) = schema {
                        conn.execute(format!("SET search_path TO {s}").as_str())
                            .await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await
            .sql_context("Failed to connect to PostgreSQL")?;

        let backend = Self {
            pool,
            kind: DbKind::Postgres,
        };
        schema::initialize(&backend).await?;
        Ok(backend)
    }

    /// Connect inside a freshly created `test_<uuid>` schema, so parallel
    /// test runs against one server never see each other's rows.
    pub async fn connect_postgres_isolated(url: &str) -> Result<Self> {
        let schema_name = format!("test_{}", uuid::Uuid::new_v4().simple());
        Self::connect_postgres_with_schema(url, Some(schema_name)).await
    }
}

#[async_trait]
impl OrderStore for SqlxBackend {
    async fn fetch_collection(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        storage::fetch_collection(self, scope).await
    }

    async fn bulk_update_order(&self, scope: Scope, updates: &[OrderUpdate]) -> Result<()> {
        storage::bulk_update_order(self, scope, updates).await
    }

    async fn delete_item(&self, scope: Scope, id: ItemId) -> Result<()> {
        storage::delete_item(self, scope, id).await
    }
}

#[async_trait]
impl Backend for SqlxBackend {
    async fn create_item(&self, scope: Scope, item: NewItem) -> Result<OrderedItem> {
        storage::create_item(self, scope, item).await
    }

    async fn update_item(&self, scope: Scope, id: ItemId, patch: ItemPatch) -> Result<OrderedItem> {
        storage::update_item(self, scope, id, patch).await
    }

    async fn set_active(&self, scope: Scope, id: ItemId, active: bool) -> Result<OrderedItem> {
        storage::set_active(self, scope, id, active).await
    }

    async fn clear_image(&self, scope: Scope, id: ItemId, field: ImageField) -> Result<OrderedItem> {
        storage::clear_image(self, scope, id, field).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(feature = "sqlite")]
pub type Sqlite = SqlxBackend;

#[cfg(feature = "postgres")]
pub type Postgres = SqlxBackend;
