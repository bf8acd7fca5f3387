//! Seed configuration types and YAML loading.
//!
//! The transition graph and the admin allowlist are declarative data
//! loaded at startup, so both can be reconfigured without touching
//! validation code.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TrackResult;
use crate::model::Status;

/// Startup seed: transition edges plus the global-admin allowlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Edges to upsert. Defaults to the permissive fully-connected graph
    /// (every ordered pair of distinct statuses active).
    #[serde(default = "permissive_seed")]
    pub transitions: Vec<TransitionSeed>,

    /// Principals to hold global ADMIN, identified by email. Replaces
    /// any hardcoded bootstrap promotion.
    #[serde(default)]
    pub admins: Vec<AdminSeed>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            transitions: permissive_seed(),
            admins: Vec::new(),
        }
    }
}

/// One transition edge to seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSeed {
    pub from: Status,
    pub to: Status,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// One allowlisted admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
}

/// Every ordered pair of distinct statuses, active.
pub fn permissive_seed() -> Vec<TransitionSeed> {
    let mut edges = Vec::new();
    for from in Status::ALL {
        for to in Status::ALL {
            if from != to {
                edges.push(TransitionSeed {
                    from,
                    to,
                    active: true,
                });
            }
        }
    }
    edges
}

impl SeedConfig {
    /// Load from a YAML string.
    pub fn load_from_str(yaml: &str) -> TrackResult<Self> {
        let config: SeedConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn load_from_file(path: &Path) -> TrackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }
}
