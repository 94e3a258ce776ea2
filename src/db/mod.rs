//! Database layer
//!
//! Connection pooling, embedded migrations, startup seeding and the
//! per-entity repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;
pub mod seed;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool};
