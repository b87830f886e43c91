//! Item storage operations for SQL backends.
//!
//! This module implements the collection operations on the `home_items` table using sqlx.

use sqlx::AnyConnection;
use tracing::debug;

use crate::Result;
use crate::backend::{self, BackendError};
use crate::order::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Payload, Scope};

use super::{SqlxBackend, SqlxResultExt};

/// Columns of `home_items` in the order every query selects them.
const ITEM_COLUMNS: &str =
    "id, position, active, title, image_url, image_mobile_url, product_id";

type ItemRow = (
    i64,
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
);

fn item_from_row(scope: Scope, row: ItemRow) -> Result<OrderedItem> {
    let (id, position, active, title, image_url, image_mobile_url, product_id) = row;

    let order = u32::try_from(position).map_err(|_| BackendError::StateInconsistency {
        reason: format!("item {id} has out-of-range position {position}"),
    })?;

    let payload = match scope {
        Scope::Carousel => Payload::Slide {
            title,
            image_url,
            image_mobile_url,
        },
        Scope::Products => Payload::Product {
            product_id: product_id.ok_or_else(|| BackendError::StateInconsistency {
                reason: format!("featured product {id} has no product_id"),
            })?,
        },
    };

    Ok(OrderedItem {
        id: ItemId(id),
        order,
        active: active != 0,
        payload,
    })
}

async fn fetch_item(conn: &mut AnyConnection, scope: Scope, id: ItemId) -> Result<OrderedItem> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM home_items WHERE scope = $1 AND id = $2");
    let row: Option<ItemRow> = sqlx::query_as(&sql)
        .bind(scope.as_str())
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .sql_context("Failed to get item")?;

    match row {
        Some(row) => item_from_row(scope, row),
        None => Err(BackendError::ItemNotFound { scope, id }.into()),
    }
}

/// Write every column of an existing item back.
async fn store_item(conn: &mut AnyConnection, scope: Scope, item: &OrderedItem) -> Result<()> {
    let (title, image_url, image_mobile_url, product_id) = payload_columns(&item.payload);
    sqlx::query(
        "UPDATE home_items
         SET position = $1, active = $2, title = $3, image_url = $4,
             image_mobile_url = $5, product_id = $6
         WHERE scope = $7 AND id = $8",
    )
    .bind(i64::from(item.order))
    .bind(i64::from(item.active))
    .bind(title)
    .bind(image_url)
    .bind(image_mobile_url)
    .bind(product_id)
    .bind(scope.as_str())
    .bind(item.id.get())
    .execute(&mut *conn)
    .await
    .sql_context("Failed to update item")?;
    Ok(())
}

fn payload_columns(
    payload: &Payload,
) -> (Option<String>, Option<String>, Option<String>, Option<i64>) {
    match payload {
        Payload::Slide {
            title,
            image_url,
            image_mobile_url,
        } => (
            title.clone(),
            image_url.clone(),
            image_mobile_url.clone(),
            None,
        ),
        Payload::Product { product_id } => (None, None, None, Some(*product_id)),
    }
}

/// Get every item of a collection, sorted by position.
pub async fn fetch_collection(backend: &SqlxBackend, scope: Scope) -> Result<Vec<OrderedItem>> {
    let sql =
        format!("SELECT {ITEM_COLUMNS} FROM home_items WHERE scope = $1 ORDER BY position, id");
    let rows: Vec<ItemRow> = sqlx::query_as(&sql)
        .bind(scope.as_str())
        .fetch_all(backend.pool())
        .await
        .sql_context("Failed to fetch collection")?;

    rows.into_iter().map(|row| item_from_row(scope, row)).collect()
}

/// Apply a batch of order changes in one transaction.
pub async fn bulk_update_order(
    backend: &SqlxBackend,
    scope: Scope,
    updates: &[OrderUpdate],
) -> Result<()> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    for update in updates {
        let result = sqlx::query("UPDATE home_items SET position = $1 WHERE scope = $2 AND id = $3")
            .bind(i64::from(update.order))
            .bind(scope.as_str())
            .bind(update.id.get())
            .execute(&mut *tx)
            .await
            .sql_context("Failed to update position")?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the rows already written
            return Err(BackendError::ItemNotFound {
                scope,
                id: update.id,
            }
            .into());
        }
    }

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;

    debug!(%scope, count = updates.len(), "Applied bulk order update");
    Ok(())
}

/// Delete one item. The positions of the others are left alone.
pub async fn delete_item(backend: &SqlxBackend, scope: Scope, id: ItemId) -> Result<()> {
    let result = sqlx::query("DELETE FROM home_items WHERE scope = $1 AND id = $2")
        .bind(scope.as_str())
        .bind(id.get())
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete item")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ItemNotFound { scope, id }.into());
    }
    Ok(())
}

/// Insert an item, allocating its id and (when not requested) its position.
///
/// Id and position are computed by the `INSERT` itself, so the first thing the
/// transaction does is write. Postgres additionally serializes creators with a
/// table lock, since two `MAX(id)` reads can otherwise see the same row set.
pub async fn create_item(backend: &SqlxBackend, scope: Scope, item: NewItem) -> Result<OrderedItem> {
    backend::check_new_item(scope, &item)?;
    let requested = item.requested_order().map(i64::from);
    let (title, image_url, image_mobile_url, product_id) = payload_columns(&item.payload);

    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    if backend.is_postgres() {
        sqlx::query("LOCK TABLE home_items IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .sql_context("Failed to lock items table")?;
    }

    // Ids are unique across both collections; positions only within one
    let (id, position): (i64, i64) = sqlx::query_as(
        "INSERT INTO home_items
            (id, scope, position, active, title, image_url, image_mobile_url, product_id)
         SELECT
            COALESCE(MAX(id), 0) + 1,
            $1,
            COALESCE($2, (SELECT COALESCE(MAX(position), 0) + 1 FROM home_items WHERE scope = $1)),
            1, $3, $4, $5, $6
         FROM home_items
         RETURNING id, position",
    )
    .bind(scope.as_str())
    .bind(requested)
    .bind(title)
    .bind(image_url)
    .bind(image_mobile_url)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await
    .sql_context("Failed to insert item")?;

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;

    let order = u32::try_from(position).map_err(|_| BackendError::StateInconsistency {
        reason: format!("position {position} out of range in {scope}"),
    })?;
    debug!(%scope, id, order, "Created item");
    Ok(OrderedItem::new(id, order, item.payload))
}

/// Take the row's write lock before reading it.
///
/// A SQLite transaction that reads first cannot upgrade to a write lock while
/// another connection holds one, and fails with `SQLITE_BUSY` instead of waiting.
async fn lock_item(conn: &mut AnyConnection, scope: Scope, id: ItemId) -> Result<()> {
    let result =
        sqlx::query("UPDATE home_items SET position = position WHERE scope = $1 AND id = $2")
            .bind(scope.as_str())
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .sql_context("Failed to lock item")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ItemNotFound { scope, id }.into());
    }
    Ok(())
}

/// Apply a partial edit to an item.
pub async fn update_item(
    backend: &SqlxBackend,
    scope: Scope,
    id: ItemId,
    patch: ItemPatch,
) -> Result<OrderedItem> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    lock_item(&mut tx, scope, id).await?;
    let mut item = fetch_item(&mut tx, scope, id).await?;
    backend::apply_patch(scope, &mut item, patch)?;
    store_item(&mut tx, scope, &item).await?;

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;
    Ok(item)
}

/// Show or hide an item.
pub async fn set_active(
    backend: &SqlxBackend,
    scope: Scope,
    id: ItemId,
    active: bool,
) -> Result<OrderedItem> {
    let mut conn = backend
        .pool()
        .acquire()
        .await
        .sql_context("Failed to acquire connection")?;

    let result = sqlx::query("UPDATE home_items SET active = $1 WHERE scope = $2 AND id = $3")
        .bind(i64::from(active))
        .bind(scope.as_str())
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .sql_context("Failed to update active flag")?;

    if result.rows_affected() == 0 {
        return Err(BackendError::ItemNotFound { scope, id }.into());
    }
    fetch_item(&mut conn, scope, id).await
}

/// Clear one image column of a slide.
pub async fn clear_image(
    backend: &SqlxBackend,
    scope: Scope,
    id: ItemId,
    field: ImageField,
) -> Result<OrderedItem> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    lock_item(&mut tx, scope, id).await?;
    let mut item = fetch_item(&mut tx, scope, id).await?;
    backend::clear_image_field(scope, &mut item, field)?;
    store_item(&mut tx, scope, &item).await?;

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;
    Ok(item)
}
