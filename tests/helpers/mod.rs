//! Shared fixtures for integration tests: an in-memory store seeded with
//! the default permissive workflow, one project, and a principal for
//! every role.

use std::sync::{Arc, Once};

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use storyflow::{
    seed, GlobalRole, IssueService, IssueType, Membership, MemoryStore, NewIssue, Principal,
    Project, ProjectRole, SeedConfig, Status, TrackStore,
};

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub service: IssueService<MemoryStore>,
    pub project: Project,
    pub admin: Principal,
    pub scrum_master: Principal,
    pub developer: Principal,
    pub tester: Principal,
    pub viewer: Principal,
    pub outsider: Principal,
    pub super_admin: Principal,
}

static TRACING: Once = Once::new();

/// Route engine logs through the test writer; filter with RUST_LOG.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn principal(name: &str, global_role: GlobalRole) -> Principal {
    Principal {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{name}@example.com"),
        global_role,
    }
}

pub fn new_issue(
    project_id: Uuid,
    issue_type: IssueType,
    status: Status,
    title: &str,
) -> NewIssue {
    NewIssue {
        project_id,
        issue_type,
        parent_issue_id: None,
        status,
        title: title.into(),
        description: "integration fixture".into(),
        assignee: String::new(),
        reviewer: String::new(),
        release_number: "R1".into(),
        sprint_number: String::new(),
        start_date: None,
        end_date: None,
    }
}

/// Build the standard world: default seed, one project "Test Project"
/// with prefix "TP", members for every role, one outsider and one
/// global admin without any membership.
pub async fn fixture() -> Result<Fixture> {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    seed::run(store.as_ref(), &SeedConfig::default()).await?;

    let project = Project {
        id: Uuid::new_v4(),
        name: "Test Project".into(),
        prefix: "TP".into(),
        created_at: Utc::now(),
    };
    store.insert_project(&project).await?;

    let admin = principal("ada", GlobalRole::User);
    let scrum_master = principal("sam", GlobalRole::User);
    let developer = principal("dev", GlobalRole::User);
    let tester = principal("tess", GlobalRole::User);
    let viewer = principal("vic", GlobalRole::User);
    let outsider = principal("out", GlobalRole::User);
    let super_admin = principal("root", GlobalRole::Admin);

    let members = [
        (&admin, ProjectRole::Admin),
        (&scrum_master, ProjectRole::ScrumMaster),
        (&developer, ProjectRole::Developer),
        (&tester, ProjectRole::Tester),
        (&viewer, ProjectRole::Viewer),
    ];
    for (who, role) in members {
        store.insert_principal(who).await?;
        store
            .upsert_membership(&Membership {
                user_id: who.id,
                project_id: project.id,
                role,
            })
            .await?;
    }
    store.insert_principal(&outsider).await?;
    store.insert_principal(&super_admin).await?;

    let service = IssueService::connect(store.clone()).await?;

    Ok(Fixture {
        store,
        service,
        project,
        admin,
        scrum_master,
        developer,
        tester,
        viewer,
        outsider,
        super_admin,
    })
}
