//! Idempotent startup seeding.
//!
//! Runs once at process start: upserts the configured transition edges
//! and reconciles the declarative global-admin allowlist. Safe to run
//! again; a second run with the same config changes nothing.

use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::error::TrackResult;
use crate::model::{GlobalRole, Principal, TransitionEdge};
use crate::store::TrackStore;

/// What a seeding pass actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub edges_upserted: usize,
    pub admins_created: usize,
    pub admins_promoted: usize,
}

/// Apply `config` to the store.
///
/// Allowlisted admins already holding global ADMIN are left untouched;
/// known principals are promoted; unknown emails get a principal record
/// created (credential issuance stays with the identity collaborator).
pub async fn run<S: TrackStore + ?Sized>(
    store: &S,
    config: &SeedConfig,
) -> TrackResult<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &config.transitions {
        store
            .upsert_transition_edge(&TransitionEdge {
                from_status: seed.from,
                to_status: seed.to,
                is_active: seed.active,
            })
            .await?;
        report.edges_upserted += 1;
    }
    info!(edges = report.edges_upserted, "workflow transitions seeded");

    for admin in &config.admins {
        match store.find_principal_by_email(&admin.email).await? {
            Some(existing) if existing.global_role == GlobalRole::Admin => {}
            Some(existing) => {
                info!(email = %admin.email, "promoting principal to global admin");
                store
                    .set_global_role(existing.id, GlobalRole::Admin)
                    .await?;
                report.admins_promoted += 1;
            }
            None => {
                warn!(email = %admin.email, "allowlisted admin unknown; creating principal");
                store
                    .insert_principal(&Principal {
                        id: Uuid::new_v4(),
                        name: admin.name.clone(),
                        email: admin.email.clone(),
                        global_role: GlobalRole::Admin,
                    })
                    .await?;
                report.admins_created += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminSeed;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn default_seed_is_permissive_graph() {
        let store = MemoryStore::new();
        let report = run(&store, &SeedConfig::default()).await.unwrap();
        assert_eq!(report.edges_upserted, 20);

        let edges = store.transition_edges().await.unwrap();
        assert_eq!(edges.len(), 20);
        assert!(edges.iter().all(|e| e.is_active));
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let store = MemoryStore::new();
        let config = SeedConfig {
            admins: vec![AdminSeed {
                name: "Ops".into(),
                email: "ops@example.com".into(),
            }],
            ..SeedConfig::default()
        };

        let first = run(&store, &config).await.unwrap();
        assert_eq!(first.admins_created, 1);
        assert_eq!(first.admins_promoted, 0);

        let second = run(&store, &config).await.unwrap();
        assert_eq!(second.admins_created, 0);
        assert_eq!(second.admins_promoted, 0);
        assert_eq!(store.transition_edges().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn existing_user_is_promoted_not_duplicated() {
        let store = MemoryStore::new();
        let existing = Principal {
            id: Uuid::new_v4(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            global_role: GlobalRole::User,
        };
        store.insert_principal(&existing).await.unwrap();

        let config = SeedConfig {
            admins: vec![AdminSeed {
                name: "Dana".into(),
                email: "dana@example.com".into(),
            }],
            ..SeedConfig::default()
        };
        let report = run(&store, &config).await.unwrap();
        assert_eq!(report.admins_promoted, 1);
        assert_eq!(report.admins_created, 0);

        let reloaded = store.get_principal(existing.id).await.unwrap().unwrap();
        assert_eq!(reloaded.global_role, GlobalRole::Admin);
    }
}
