//! Kabadiyo points ledger.
//!
//! Scrap sellers earn points for completed orders and referrals and spend
//! them on catalog rewards or a fixed ₹2000 service redemption. The crate is
//! laid out hexagonally: [`domain`] holds the ledger rules and ports,
//! [`inbound`] the HTTP adapter, and [`outbound`] the PostgreSQL and
//! in-memory repositories.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::trace_requests;
