//! # Models Module
//!
//! Command records and the PostgreSQL-backed record store.

pub mod command;

pub use command::*;
