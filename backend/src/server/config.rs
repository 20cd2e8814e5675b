//! Listener, session cookie and ledger store settings for the server.

use std::net::SocketAddr;

use kabadiyo::inbound::http::session_config::SessionSettings;
use kabadiyo::outbound::persistence::DbPool;

/// Where balances and redemptions are kept.
pub enum LedgerBackend {
    /// Process memory seeded with the default catalog; lost on restart.
    Memory,
    Postgres(DbPool),
}

impl LedgerBackend {
    /// Label reported by health checks and the startup log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

/// Everything `create_server` needs besides the health state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ledger: LedgerBackend,
}

impl ServerConfig {
    /// Serve an in-memory ledger until a pool is attached.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            ledger: LedgerBackend::Memory,
        }
    }

    /// Keep the ledger in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.ledger = LedgerBackend::Postgres(pool);
        self
    }
}
