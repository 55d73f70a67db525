//! # rbac-database
//!
//! Remote store access for the RBAC console: PostgreSQL connection
//! management, the migration runner, one repository per table, and the
//! [`RbacStore`] adapters the cache layer talks to.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{MemoryRbacStore, PgRbacStore, RbacStore, open_store};
