//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and depend only on
//! domain ports, so they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, PointsCommand, PointsQuery, ReferralCommand, RewardsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub points_query: Arc<dyn PointsQuery>,
    pub points_command: Arc<dyn PointsCommand>,
    pub rewards: Arc<dyn RewardsQuery>,
    pub referrals: Arc<dyn ReferralCommand>,
}

impl HttpState {
    /// Wire every ledger port to one service implementing all of them.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use kabadiyo::domain::{LedgerLoginService, PointsLedgerService};
    /// use kabadiyo::inbound::http::state::HttpState;
    /// use kabadiyo::outbound::memory::InMemoryLedgerRepository;
    /// use mockable::DefaultClock;
    ///
    /// let repository = Arc::new(InMemoryLedgerRepository::with_default_catalog());
    /// let ledger = Arc::new(PointsLedgerService::new(
    ///     Arc::clone(&repository),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::for_ledger(ledger, Arc::new(LedgerLoginService::new(repository)));
    /// # let _ = state;
    /// ```
    pub fn for_ledger<S>(ledger: Arc<S>, login: Arc<dyn LoginService>) -> Self
    where
        S: PointsQuery + PointsCommand + RewardsQuery + ReferralCommand + 'static,
    {
        Self {
            login,
            points_query: ledger.clone(),
            points_command: ledger.clone(),
            rewards: ledger.clone(),
            referrals: ledger,
        }
    }
}
