//! Driven adapters: the PostgreSQL ledger and its in-process stand-in.

pub mod memory;
pub mod persistence;
