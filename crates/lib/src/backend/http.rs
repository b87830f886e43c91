//! Remote store reached through the Vitrina REST API.
//!
//! [`HttpStore`] lets an admin client (the CLI, or a [`Reconciler`](crate::Reconciler)
//! running outside the server process) work on a server's collections with
//! the same traits as the local backends.

use std::any::Any;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::api::{ErrorBody, ToggleRequest};
use crate::backend::{Backend, BackendError, OrderStore};
use crate::order::{ImageField, ItemId, ItemPatch, NewItem, OrderUpdate, OrderedItem, Scope};

/// HTTP client for a running Vitrina server.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    /// Create a store for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::build(base_url.into(), None)
    }

    /// Like [`new`](Self::new), failing any request that takes longer than `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::build(base_url.into(), Some(timeout))
    }

    fn build(base_url: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| BackendError::Transport {
            url: base_url.clone(),
            reason: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The server this store talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn admin_url(&self, scope: Scope) -> String {
        format!("{}/api/admin/home/{scope}", self.base_url)
    }

    fn item_url(&self, scope: Scope, id: ItemId) -> String {
        format!("{}/api/admin/home/{scope}/{id}", self.base_url)
    }

    /// Check the server's `/health` endpoint.
    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = format!("{}/health", self.base_url);
        let response = send(self.client.get(&url), &url).await?;
        let response = check_status(response, None).await?;
        read_json(response, &url).await
    }

    /// Public homepage view of a collection.
    pub async fn fetch_public(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        let url = format!("{}/api/home/{scope}", self.base_url);
        let response = send(self.client.get(&url), &url).await?;
        let response = check_status(response, None).await?;
        read_json(response, &url).await
    }

    async fn send_item<B: Serialize + Sync>(
        &self,
        request: RequestBuilder,
        url: &str,
        body: &B,
        item: Option<(Scope, ItemId)>,
    ) -> Result<OrderedItem> {
        let response = send(request.json(body), url).await?;
        let response = check_status(response, item).await?;
        read_json(response, url).await
    }
}

async fn send(request: RequestBuilder, url: &str) -> Result<Response> {
    request.send().await.map_err(|e| {
        BackendError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Turn error statuses into `BackendError`s, reading the server's `{message}` body.
async fn check_status(response: Response, item: Option<(Scope, ItemId)>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND
        && let Some((scope, id)) = item
    {
        return Err(BackendError::ItemNotFound { scope, id }.into());
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    }
    .into())
}

async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T> {
    response.json::<T>().await.map_err(|e| {
        BackendError::Transport {
            url: url.to_string(),
            reason: format!("Failed to parse response: {e}"),
        }
        .into()
    })
}

#[async_trait]
impl OrderStore for HttpStore {
    async fn fetch_collection(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        let url = self.admin_url(scope);
        let response = send(self.client.get(&url), &url).await?;
        let response = check_status(response, None).await?;
        read_json(response, &url).await
    }

    async fn bulk_update_order(&self, scope: Scope, updates: &[OrderUpdate]) -> Result<()> {
        let url = format!("{}/order", self.admin_url(scope));
        let response = send(self.client.put(&url).json(updates), &url).await?;
        check_status(response, None).await?;
        Ok(())
    }

    async fn delete_item(&self, scope: Scope, id: ItemId) -> Result<()> {
        let url = self.item_url(scope, id);
        let response = send(self.client.delete(&url), &url).await?;
        check_status(response, Some((scope, id))).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpStore {
    async fn fetch_active(&self, scope: Scope) -> Result<Vec<OrderedItem>> {
        self.fetch_public(scope).await
    }

    async fn create_item(&self, scope: Scope, item: NewItem) -> Result<OrderedItem> {
        let url = self.admin_url(scope);
        self.send_item(self.client.post(&url), &url, &item, None)
            .await
    }

    async fn update_item(&self, scope: Scope, id: ItemId, patch: ItemPatch) -> Result<OrderedItem> {
        let url = self.item_url(scope, id);
        self.send_item(self.client.put(&url), &url, &patch, Some((scope, id)))
            .await
    }

    async fn set_active(&self, scope: Scope, id: ItemId, active: bool) -> Result<OrderedItem> {
        let url = format!("{}/toggle", self.item_url(scope, id));
        self.send_item(
            self.client.patch(&url),
            &url,
            &ToggleRequest { active },
            Some((scope, id)),
        )
        .await
    }

    async fn clear_image(&self, scope: Scope, id: ItemId, field: ImageField) -> Result<OrderedItem> {
        let url = self.item_url(scope, id);
        let request = self
            .client
            .delete(&url)
            .query(&[("field", field.as_str())]);
        let response = send(request, &url).await?;
        let response = check_status(response, Some((scope, id))).await?;
        read_json(response, &url).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
