//! Property-based tests for the bounded context store

mod context_store;
