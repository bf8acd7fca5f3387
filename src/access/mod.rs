//! Access control: per-project role resolution and capability evaluation.
//!
//! The gate every mutation passes through before any structural
//! validation runs.

pub mod permissions;
pub mod resolver;

pub use permissions::{is_owner, Capability};
pub use resolver::resolve_role;
