//! Utilities for the integration tests

pub mod books;
pub mod transactions;
