//! Serve command - runs the Vitrina REST API server.

use tokio::signal::unix::{SignalKind, signal};

use vitrina::api::ApiServer;

use crate::backend::{create_backend, json_path, save_if_in_memory};
use crate::cli::ServeArgs;

/// Run the Vitrina server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;

    let server = ApiServer::start(&format!("{}:{}", args.host, args.port), backend.clone()).await?;

    println!(
        "Vitrina Server starting on http://localhost:{}",
        server.local_addr().port()
    );
    println!();
    println!("Available endpoints:");
    println!("  GET    /health                                - Health check");
    println!("  GET    /api/home/{{scope}}                      - Public homepage items");
    println!("  GET    /api/admin/home/{{scope}}                - All items, in order");
    println!("  POST   /api/admin/home/{{scope}}                - Create an item");
    println!("  PUT    /api/admin/home/{{scope}}/order          - Bulk order update");
    println!("  PUT    /api/admin/home/{{scope}}/{{id}}           - Edit an item");
    println!("  DELETE /api/admin/home/{{scope}}/{{id}}           - Delete an item or one image");
    println!("  PATCH  /api/admin/home/{{scope}}/{{id}}/toggle    - Show or hide an item");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }

    server.shutdown().await?;

    // Only the in-memory backend needs an explicit save
    let json_path = json_path(&args.backend_config);
    match save_if_in_memory(backend.as_ref(), &json_path).await {
        Ok(true) => println!("\nDatabase saved successfully"),
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Failed to save database: {e:?}");
            eprintln!("Failed to save database: {e:?}");
        }
    }

    println!("Server shut down");
    Ok(())
}
