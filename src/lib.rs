//! storyflow — issue-tracking core engine.
//!
//! The decision logic between "an authenticated principal wants to do X"
//! and "the mutation is applied and recorded": per-project role
//! resolution and capability evaluation, issue hierarchy validation,
//! a data-driven workflow transition graph with the parent-done guard,
//! and an append-only per-save audit trail. HTTP, credentials and schema
//! management live in collaborating services.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storyflow::{seed, IssueService, MemoryStore, SeedConfig};
//!
//! # async fn demo() -> storyflow::TrackResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! seed::run(store.as_ref(), &SeedConfig::default()).await?;
//! let service = IssueService::connect(store).await?;
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Domain types
pub mod model;

// Access control: role resolution + capability table
pub mod access;

// Structural validation
pub mod hierarchy;

// Workflow transition graph + engine
pub mod workflow;

// Aggregated per-save audit diffing
pub mod audit;

// Seed configuration and the idempotent startup seeding step
pub mod config;
pub mod seed;

// Persistence seam (in-memory always; Postgres behind `database`)
pub mod store;

// Transaction coordinator
pub mod service;

// Public re-exports for the common path
pub use access::{Capability, is_owner, resolve_role};
pub use audit::{ChangeSet, FieldDiff};
pub use config::{AdminSeed, SeedConfig, TransitionSeed};
pub use error::{EntityKind, TrackError, TrackResult};
pub use model::{
    ActivityAction, ActivityRecord, GlobalRole, Issue, IssuePatch, IssueType, Membership,
    NewIssue, Principal, Project, ProjectRole, Status, TransitionEdge,
};
pub use service::IssueService;
pub use store::{MemoryStore, TrackStore};
pub use workflow::{TransitionGraph, WorkflowEngine};

#[cfg(feature = "database")]
pub use store::{DatabaseConfig, PgStore};
