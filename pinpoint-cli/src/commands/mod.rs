//! CLI command implementations.

pub mod config;
pub mod pick;
pub mod reverse;
pub mod search;
