//! Ownership repositories.
pub mod in_memory;
