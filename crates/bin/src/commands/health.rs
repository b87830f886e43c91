//! Health check command - checks a running Vitrina server.

use std::time::Duration;

use vitrina::backend::http::HttpStore;

use crate::cli::HealthArgs;

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.url.trim_end_matches('/');
    let base = base.strip_suffix("/health").unwrap_or(base);
    let store = HttpStore::with_timeout(base, Duration::from_secs(args.timeout))?;

    match store.health().await {
        Ok(body) => {
            let status = body.get("status").and_then(|s| s.as_str()).unwrap_or("");
            if status == "healthy" {
                println!("healthy: {}", body);
                Ok(())
            } else {
                eprintln!("unhealthy: server returned status {}", status);
                std::process::exit(1);
            }
        }
        Err(e) if e.is_transport_error() => {
            eprintln!("unhealthy: failed to connect to {}: {}", store.base_url(), e);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("unhealthy: {}", e);
            std::process::exit(1);
        }
    }
}
