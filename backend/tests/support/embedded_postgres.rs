//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! Each test gets its own migrated database on one shared cluster. When the
//! cluster cannot start, `SKIP_TEST_CLUSTER=1` turns the failure into a
//! skip; otherwise the test panics so CI breakage is not masked.

use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;

use kabadiyo::outbound::persistence::run_pending_migrations;

/// Whether `SKIP_TEST_CLUSTER` is set to `1`, `true` or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip or fail a test whose cluster could not be prepared.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

const CLUSTER_ATTEMPTS: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// The process-wide cluster, retried while another test binary releases
/// the data directory.
fn cluster() -> BootstrapResult<&'static ClusterHandle> {
    let mut attempt = 1;
    loop {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= CLUSTER_ATTEMPTS => return Err(error),
            Err(_) => {
                std::thread::sleep(CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Create a fresh database on the shared cluster and apply the ledger
/// migrations to it.
pub fn migrated_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let cluster = cluster().map_err(|err| format!("shared cluster: {err:?}"))?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("create database: {err:?}"))?;
    runtime
        .block_on(run_pending_migrations(database.url()))
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}
