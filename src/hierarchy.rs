//! Issue hierarchy validation.
//!
//! Epic → Story → Task → Subtask, plus Bug attachable under a Story or
//! Task. Evaluated exactly once per creation, before any row is written;
//! the caller fetches the declared parent at most once and passes it in.

use uuid::Uuid;

use crate::error::{TrackError, TrackResult};
use crate::model::{Issue, IssueType};

fn violation(issue_type: IssueType, reason: impl Into<String>) -> TrackError {
    TrackError::InvalidHierarchy {
        issue_type,
        reason: reason.into(),
    }
}

/// Validate the declared parent for a new issue of `issue_type` in
/// `project_id`.
///
/// `declared_parent` is the id from the creation request; `parent` is the
/// fetched row, `None` when the id did not resolve. Each failure mode has
/// its own wording so the API layer can surface it verbatim.
pub fn validate_parent(
    issue_type: IssueType,
    project_id: Uuid,
    declared_parent: Option<Uuid>,
    parent: Option<&Issue>,
) -> TrackResult<()> {
    match issue_type {
        IssueType::Epic => {
            if declared_parent.is_some() {
                return Err(violation(issue_type, "Epics cannot have a parent issue."));
            }
            Ok(())
        }
        IssueType::Story => require_parent(
            issue_type,
            project_id,
            declared_parent,
            parent,
            IssueType::Epic,
            "Stories must belong to an Epic.",
            "Parent Epic not found.",
        ),
        IssueType::Task => require_parent(
            issue_type,
            project_id,
            declared_parent,
            parent,
            IssueType::Story,
            "Tasks must belong to a Story.",
            "Parent Story not found.",
        ),
        IssueType::Subtask => require_parent(
            issue_type,
            project_id,
            declared_parent,
            parent,
            IssueType::Task,
            "Subtasks must belong to a Task.",
            "Parent Task not found.",
        ),
        IssueType::Bug => {
            // Parent is optional for bugs; when present it must be a
            // story or task in the same project.
            let Some(_) = declared_parent else {
                return Ok(());
            };
            let Some(parent) = parent else {
                return Err(violation(issue_type, "Parent issue not found."));
            };
            if parent.project_id != project_id {
                return Err(violation(
                    issue_type,
                    "Parent issue belongs to a different project.",
                ));
            }
            if !matches!(parent.issue_type, IssueType::Story | IssueType::Task) {
                return Err(violation(
                    issue_type,
                    format!(
                        "Bug parent must be a Story or Task, got {}.",
                        parent.issue_type
                    ),
                ));
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn require_parent(
    issue_type: IssueType,
    project_id: Uuid,
    declared_parent: Option<Uuid>,
    parent: Option<&Issue>,
    expected: IssueType,
    missing_msg: &str,
    not_found_msg: &str,
) -> TrackResult<()> {
    if declared_parent.is_none() {
        return Err(violation(issue_type, missing_msg));
    }
    let Some(parent) = parent else {
        return Err(violation(issue_type, not_found_msg));
    };
    if parent.project_id != project_id {
        return Err(violation(
            issue_type,
            "Parent issue belongs to a different project.",
        ));
    }
    if parent.issue_type != expected {
        // "Story parent must be an Epic, got task."
        let capitalized = match expected {
            IssueType::Epic => "an Epic",
            IssueType::Story => "a Story",
            IssueType::Task => "a Task",
            IssueType::Subtask => "a Subtask",
            IssueType::Bug => "a Bug",
        };
        let child = match issue_type {
            IssueType::Epic => "Epic",
            IssueType::Story => "Story",
            IssueType::Task => "Task",
            IssueType::Subtask => "Subtask",
            IssueType::Bug => "Bug",
        };
        return Err(violation(
            issue_type,
            format!(
                "{child} parent must be {capitalized}, got {}.",
                parent.issue_type
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::Utc;

    fn issue_of_type(issue_type: IssueType, project_id: Uuid) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            project_id,
            code: "TP-0001".into(),
            issue_type,
            parent_issue_id: None,
            status: Status::Backlog,
            title: "parent".into(),
            description: String::new(),
            assignee: String::new(),
            reviewer: String::new(),
            release_number: "R1".into(),
            sprint_number: String::new(),
            start_date: None,
            end_date: None,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            version: 0,
        }
    }

    fn reason(err: TrackError) -> String {
        match err {
            TrackError::InvalidHierarchy { reason, .. } => reason,
            other => panic!("expected InvalidHierarchy, got {other:?}"),
        }
    }

    #[test]
    fn epic_rejects_any_parent() {
        let project = Uuid::new_v4();
        let parent = issue_of_type(IssueType::Story, project);
        let err = validate_parent(IssueType::Epic, project, Some(parent.id), Some(&parent))
            .unwrap_err();
        assert_eq!(reason(err), "Epics cannot have a parent issue.");
    }

    #[test]
    fn epic_without_parent_is_fine() {
        assert!(validate_parent(IssueType::Epic, Uuid::new_v4(), None, None).is_ok());
    }

    #[test]
    fn story_requires_a_parent() {
        let err = validate_parent(IssueType::Story, Uuid::new_v4(), None, None).unwrap_err();
        assert_eq!(reason(err), "Stories must belong to an Epic.");
    }

    #[test]
    fn story_parent_must_resolve() {
        let err = validate_parent(IssueType::Story, Uuid::new_v4(), Some(Uuid::new_v4()), None)
            .unwrap_err();
        assert_eq!(reason(err), "Parent Epic not found.");
    }

    #[test]
    fn story_under_task_names_the_expected_type() {
        let project = Uuid::new_v4();
        let parent = issue_of_type(IssueType::Task, project);
        let err = validate_parent(IssueType::Story, project, Some(parent.id), Some(&parent))
            .unwrap_err();
        assert_eq!(reason(err), "Story parent must be an Epic, got task.");
    }

    #[test]
    fn task_chain_wordings() {
        let err = validate_parent(IssueType::Task, Uuid::new_v4(), None, None).unwrap_err();
        assert_eq!(reason(err), "Tasks must belong to a Story.");

        let err = validate_parent(IssueType::Subtask, Uuid::new_v4(), None, None).unwrap_err();
        assert_eq!(reason(err), "Subtasks must belong to a Task.");

        let err = validate_parent(IssueType::Subtask, Uuid::new_v4(), Some(Uuid::new_v4()), None)
            .unwrap_err();
        assert_eq!(reason(err), "Parent Task not found.");
    }

    #[test]
    fn valid_chain_accepts() {
        let project = Uuid::new_v4();
        let epic = issue_of_type(IssueType::Epic, project);
        assert!(validate_parent(IssueType::Story, project, Some(epic.id), Some(&epic)).is_ok());

        let story = issue_of_type(IssueType::Story, project);
        assert!(validate_parent(IssueType::Task, project, Some(story.id), Some(&story)).is_ok());

        let task = issue_of_type(IssueType::Task, project);
        assert!(validate_parent(IssueType::Subtask, project, Some(task.id), Some(&task)).is_ok());
    }

    #[test]
    fn bug_parent_is_optional_but_constrained() {
        let project = Uuid::new_v4();
        assert!(validate_parent(IssueType::Bug, project, None, None).is_ok());

        let story = issue_of_type(IssueType::Story, project);
        assert!(validate_parent(IssueType::Bug, project, Some(story.id), Some(&story)).is_ok());

        let task = issue_of_type(IssueType::Task, project);
        assert!(validate_parent(IssueType::Bug, project, Some(task.id), Some(&task)).is_ok());

        let epic = issue_of_type(IssueType::Epic, project);
        let err =
            validate_parent(IssueType::Bug, project, Some(epic.id), Some(&epic)).unwrap_err();
        assert_eq!(reason(err), "Bug parent must be a Story or Task, got epic.");
    }

    #[test]
    fn cross_project_parent_is_rejected() {
        let project = Uuid::new_v4();
        let foreign = issue_of_type(IssueType::Epic, Uuid::new_v4());
        let err = validate_parent(IssueType::Story, project, Some(foreign.id), Some(&foreign))
            .unwrap_err();
        assert_eq!(reason(err), "Parent issue belongs to a different project.");
    }
}
