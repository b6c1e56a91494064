//! Persistence layer for the assessment service.
//!
//! Provides SQLite-backed storage for projects and their site inputs.
//! Uses write-through caching with DashMap for hot data access.

pub mod db;
pub mod projects;

pub use db::{clear_all, init_database, Database};
