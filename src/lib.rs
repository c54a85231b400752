#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Maintenance Core
//!
//! Scheduled site maintenance for the consultancy website: one authenticated
//! trigger runs four jobs in a fixed order and records what happened.
//!
//! ## Overview
//!
//! 1. `automated-article-generation` drafts and stores one blog article
//! 2. `website-crawling-analysis` crawls the public pages and scores reachability
//! 3. `update-knowledge-base` reports placeholder knowledge-base statistics
//! 4. `seo-optimization` runs on-page SEO checks
//!
//! Each run is an **OrchestrationRun** row; each job call is a **JobExecution**
//! row; the crawl and SEO jobs add an **AnalysisResult**. Jobs are paced by a
//! configurable delay (5 s by default) and never overlap within a run.
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration (defaults, TOML file, environment)
//! - [`constants`] - Job names, statuses and system defaults
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and operation loggers
//! - [`models`] - Row types for the maintenance tables
//! - [`database`] - Connection, migrations and the store abstraction
//! - [`orchestration`] - The run loop, failure policy and job invocation
//! - [`jobs`] - The four maintenance jobs and their runner
//! - [`web`] - Axum routes, bearer auth and handlers
//! - [`bootstrap`] - Assembly of the application state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use maintenance_core::bootstrap::{build_app_state, SystemComponents};
//! use maintenance_core::config::MaintenanceConfig;
//! use maintenance_core::database::InMemoryStore;
//!
//! # async fn example() -> maintenance_core::Result<()> {
//! let config = MaintenanceConfig::from_env()?;
//! let components = SystemComponents::from_config(&config, Arc::new(InMemoryStore::new()))?;
//! let state = build_app_state(config, components)?;
//!
//! let outcome = state.orchestrator.run().await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests (in-memory store)
//! ```

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod web;

pub use config::MaintenanceConfig;
pub use constants::{ExecutionStatus, JobName};
pub use error::{MaintenanceError, Result};
pub use orchestration::{FailurePolicy, MaintenanceOrchestrator, OrchestrationOutcome};
