//! Store layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - One shared connection pool, passed in explicitly
//! - Store clock (`NOW()`) for every timestamp
//! - Rely on constraints and atomic upserts, no in-process locks

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{begin, connect, UnitOfWork};
pub use repos::*;
pub use schema::prepare_tables;
