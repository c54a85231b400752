//! # Database Operations
//!
//! Connection management, embedded migrations and the [`MaintenanceStore`]
//! seam through which the orchestrator and the jobs persist their records.
//!
//! ## Key Components
//!
//! - [`connection`] - Postgres pool creation, migrations and health checks
//! - [`store`] - The store trait and its Postgres implementation
//! - [`memory`] - In-process store used by tests and dry runs
//!
//! Each operation is a single statement; no transaction spans more than one
//! write, matching the one-row-at-a-time bookkeeping of the pipeline.

pub mod connection;
pub mod memory;
pub mod store;

pub use connection::DatabaseConnection;
pub use memory::InMemoryStore;
pub use store::{MaintenanceStore, PgMaintenanceStore};
