//! REST API over a [`Backend`].
//!
//! The public storefront reads `/api/home/{scope}`; the admin panel uses the
//! `/api/admin/home/{scope}` routes. `{scope}` is `carousel` or `products`.
//! Every error response is a JSON `{"message": ...}` object.

mod errors;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, put};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::Result;
use crate::backend::Backend;

pub use errors::{ApiError, ErrorBody};
pub use handlers::ToggleRequest;

/// Build the router serving `backend`.
pub fn router(backend: Arc<dyn Backend>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/home/{scope}", get(handlers::list_public))
        .route(
            "/api/admin/home/{scope}",
            get(handlers::list_admin).post(handlers::create),
        )
        .route("/api/admin/home/{scope}/order", put(handlers::reorder))
        .route(
            "/api/admin/home/{scope}/{id}",
            put(handlers::update).delete(handlers::delete),
        )
        .route("/api/admin/home/{scope}/{id}/toggle", patch(handlers::toggle))
        .fallback(handlers::fallback)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(backend)
}

/// A running API server, stopped by [`shutdown`](ApiServer::shutdown) or on drop.
pub struct ApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl ApiServer {
    /// Bind `addr` (port 0 picks a free port) and start serving `backend`.
    pub async fn start(addr: &str, backend: Arc<dyn Backend>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = router(backend);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!(%addr, "API server started");
        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    /// The bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match (&mut self.handle).await {
            Ok(result) => Ok(result?),
            Err(e) => Err(std::io::Error::other(format!("server task failed: {e}")).into()),
        }
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
