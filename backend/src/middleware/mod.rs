//! Request middleware.

pub mod trace;

pub use trace::trace_requests;
