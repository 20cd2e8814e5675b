//! Ledger wiring for the HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;

use kabadiyo::domain::ports::LedgerRepository;
use kabadiyo::domain::{LedgerLoginService, PointsLedgerService};
use kabadiyo::inbound::http::state::HttpState;
use kabadiyo::outbound::memory::InMemoryLedgerRepository;
use kabadiyo::outbound::persistence::DieselLedgerRepository;

use super::config::LedgerBackend;

fn wire<R>(repository: Arc<R>) -> HttpState
where
    R: LedgerRepository + 'static,
{
    let ledger = Arc::new(PointsLedgerService::new(
        Arc::clone(&repository),
        Arc::new(DefaultClock),
    ));
    let login = Arc::new(LedgerLoginService::new(repository));
    HttpState::for_ledger(ledger, login)
}

/// Use PostgreSQL when a pool is configured, otherwise an in-memory ledger
/// seeded with the default catalog.
pub(crate) fn build_http_state(backend: &LedgerBackend) -> HttpState {
    match backend {
        LedgerBackend::Postgres(pool) => wire(Arc::new(DieselLedgerRepository::new(pool.clone()))),
        LedgerBackend::Memory => wire(Arc::new(InMemoryLedgerRepository::with_default_catalog())),
    }
}
