/*! Integration tests for Vitrina.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - backend: Tests for the Backend traits and their implementations
 * - reconcile: End-to-end reordering and deletion against a real store
 * - api: The REST API and the HttpStore client talking to it
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("vitrina=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod helpers;
mod reconcile;
