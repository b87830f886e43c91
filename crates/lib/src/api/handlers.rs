//! Request handlers for the homepage REST API.

use std::any::Any;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use crate::backend::Backend;
use crate::backend::database::InMemory;
#[cfg(any(feature = "sqlite", feature = "postgres"))]
use crate::backend::database::{DbKind, SqlxBackend};
use crate::backend::http::HttpStore;
use crate::order::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Scope};

pub(crate) type AppState = Arc<dyn Backend>;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Body of `PATCH /api/admin/home/{scope}/{id}/toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParams {
    field: Option<ImageField>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    database: &'static str,
    backend: &'static str,
    timestamp: String,
}

fn parse_scope(raw: &str) -> ApiResult<Scope> {
    raw.parse()
        .map_err(|e: crate::order::OrderError| ApiError::not_found(e.to_string()))
}

fn item_path(path: Result<Path<(String, i64)>, PathRejection>) -> ApiResult<(Scope, ItemId)> {
    let Path((scope, id)) = path.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    Ok((parse_scope(&scope)?, ItemId(id)))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
fn sql_kind(any: &dyn Any) -> Option<&'static str> {
    any.downcast_ref::<SqlxBackend>().map(|sqlx| match sqlx.kind() {
        DbKind::Sqlite => "sqlite",
        DbKind::Postgres => "postgres",
    })
}

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
fn sql_kind(_any: &dyn Any) -> Option<&'static str> {
    None
}

fn backend_kind(backend: &dyn Backend) -> &'static str {
    let any = backend.as_any();
    if let Some(kind) = sql_kind(any) {
        kind
    } else if any.is::<InMemory>() {
        "inmemory"
    } else if any.is::<HttpStore>() {
        "http"
    } else {
        "unknown"
    }
}

/// GET /health
pub(crate) async fn health(State(backend): State<AppState>) -> Response {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match backend.fetch_collection(Scope::Carousel).await {
        Ok(_) => Json(HealthResponse {
            status: "healthy",
            database: "connected",
            backend: backend_kind(backend.as_ref()),
            timestamp,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    backend: backend_kind(backend.as_ref()),
                    timestamp,
                }),
            )
                .into_response()
        }
    }
}

/// GET /api/home/{scope}
pub(crate) async fn list_public(
    State(backend): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<Json<Vec<OrderedItem>>> {
    let scope = parse_scope(&scope)?;
    Ok(Json(backend.fetch_active(scope).await?))
}

/// GET /api/admin/home/{scope}
pub(crate) async fn list_admin(
    State(backend): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<Json<Vec<OrderedItem>>> {
    let scope = parse_scope(&scope)?;
    Ok(Json(backend.fetch_collection(scope).await?))
}

/// POST /api/admin/home/{scope}
pub(crate) async fn create(
    State(backend): State<AppState>,
    Path(scope): Path<String>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderedItem>)> {
    let scope = parse_scope(&scope)?;
    let item = backend.create_item(scope, json_body(body)?).await?;
    tracing::info!(%scope, id = %item.id, order = item.order, "Created item");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/admin/home/{scope}/order
pub(crate) async fn reorder(
    State(backend): State<AppState>,
    Path(scope): Path<String>,
    body: Result<Json<Vec<OrderUpdate>>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let scope = parse_scope(&scope)?;
    let updates = json_body(body)?;
    backend.bulk_update_order(scope, &updates).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/home/{scope}/{id}
pub(crate) async fn update(
    State(backend): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
    body: Result<Json<ItemPatch>, JsonRejection>,
) -> ApiResult<Json<OrderedItem>> {
    let (scope, id) = item_path(path)?;
    let item = backend.update_item(scope, id, json_body(body)?).await?;
    Ok(Json(item))
}

/// DELETE /api/admin/home/{scope}/{id}[?field=image_url|image_mobile_url]
pub(crate) async fn delete(
    State(backend): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
    params: Result<Query<DeleteParams>, QueryRejection>,
) -> ApiResult<Response> {
    let (scope, id) = item_path(path)?;
    let Query(params) = params.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    match params.field {
        Some(field) => {
            let item = backend.clear_image(scope, id, field).await?;
            Ok(Json(item).into_response())
        }
        None => {
            backend.delete_item(scope, id).await?;
            tracing::info!(%scope, %id, "Deleted item");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// PATCH /api/admin/home/{scope}/{id}/toggle
pub(crate) async fn toggle(
    State(backend): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<Json<OrderedItem>> {
    let (scope, id) = item_path(path)?;
    let ToggleRequest { active } = json_body(body)?;
    Ok(Json(backend.set_active(scope, id, active).await?))
}

/// Anything not routed above.
pub(crate) async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// A routed path hit with a method it doesn't serve.
pub(crate) async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} not allowed for {}", uri.path()),
    )
}
