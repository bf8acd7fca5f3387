//! Per-save aggregated audit diffing.
//!
//! Diffs are computed over an immutable before-snapshot and the proposed
//! after-values, compared by normalized string rendering. An empty change
//! set produces no record at all, which is what keeps no-op saves
//! audit-silent.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::model::{ActivityAction, ActivityRecord};

/// Rendering for absent values in diff lines.
const NONE_LABEL: &str = "None";

/// One changed field: display name plus normalized old/new renderings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: &'static str,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl FieldDiff {
    /// `"<Field Display Name>: <old or 'None'> → <new or 'None'>"`
    pub fn render(&self) -> String {
        format!(
            "{}: {} → {}",
            self.field,
            self.old.as_deref().unwrap_or(NONE_LABEL),
            self.new.as_deref().unwrap_or(NONE_LABEL),
        )
    }
}

/// Accumulates field diffs for one save. Only fields whose normalized
/// renderings actually differ are recorded.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    diffs: Vec<FieldDiff>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a string-valued field if it changed.
    pub fn record_str(&mut self, field: &'static str, old: &str, new: &str) {
        self.record(field, Some(old.to_string()), Some(new.to_string()));
    }

    /// Record a date field, normalized to `YYYY-MM-DD`.
    pub fn record_date(
        &mut self,
        field: &'static str,
        old: Option<NaiveDate>,
        new: Option<NaiveDate>,
    ) {
        self.record(
            field,
            old.map(|d| d.format("%Y-%m-%d").to_string()),
            new.map(|d| d.format("%Y-%m-%d").to_string()),
        );
    }

    /// Record an already-normalized pair. Comparison is string equality
    /// of the rendered values, so `None` and a literal `"None"` string
    /// compare equal — intentionally, matching the stringified diffing
    /// of the stored data.
    pub fn record(&mut self, field: &'static str, old: Option<String>, new: Option<String>) {
        let old_rendered = old.as_deref().unwrap_or(NONE_LABEL);
        let new_rendered = new.as_deref().unwrap_or(NONE_LABEL);
        if old_rendered != new_rendered {
            self.diffs.push(FieldDiff { field, old, new });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diffs.len()
    }

    pub fn diffs(&self) -> &[FieldDiff] {
        &self.diffs
    }

    /// Build the single aggregated record for this save, or `None` when
    /// nothing changed (no record is written in that case).
    pub fn into_record(
        self,
        issue_id: Uuid,
        actor_id: Option<Uuid>,
        action: ActivityAction,
        created_at: DateTime<Utc>,
    ) -> Option<ActivityRecord> {
        if self.diffs.is_empty() {
            return None;
        }
        let change_count = self.diffs.len() as u32;
        let details = self
            .diffs
            .iter()
            .map(FieldDiff::render)
            .collect::<Vec<_>>()
            .join("\n");
        Some(ActivityRecord {
            id: Uuid::new_v4(),
            issue_id,
            actor_id,
            action,
            details,
            change_count,
            created_at,
        })
    }
}

/// The synthetic initial diff logged at creation: status and title from
/// `None` to their initial values, not a literal empty-to-value of every
/// field.
pub fn creation_changes(status: &str, title: &str) -> ChangeSet {
    let mut changes = ChangeSet::new();
    changes.record("Status", None, Some(status.to_string()));
    changes.record("Title", None, Some(title.to_string()));
    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_fields_are_not_recorded() {
        let mut changes = ChangeSet::new();
        changes.record_str("Title", "same", "same");
        changes.record_str("Assignee", "ana", "ben");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.diffs()[0].render(), "Assignee: ana → ben");
    }

    #[test]
    fn empty_change_set_yields_no_record() {
        let changes = ChangeSet::new();
        assert!(changes
            .into_record(Uuid::new_v4(), None, ActivityAction::Updated, Utc::now())
            .is_none());
    }

    #[test]
    fn record_aggregates_all_lines_with_count() {
        let mut changes = ChangeSet::new();
        changes.record_str("Title", "old title", "new title");
        changes.record_str("Assignee", "ana", "ben");
        let record = changes
            .into_record(Uuid::new_v4(), None, ActivityAction::Updated, Utc::now())
            .unwrap();
        assert_eq!(record.change_count, 2);
        assert_eq!(
            record.details,
            "Title: old title → new title\nAssignee: ana → ben"
        );
    }

    #[test]
    fn date_normalization() {
        let mut changes = ChangeSet::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        changes.record_date("Start Date", None, Some(day));
        assert_eq!(changes.diffs()[0].render(), "Start Date: None → 2025-03-09");

        // Same date on both sides is not a change.
        let mut unchanged = ChangeSet::new();
        unchanged.record_date("End Date", Some(day), Some(day));
        assert!(unchanged.is_empty());
    }

    #[test]
    fn creation_diff_is_status_and_title() {
        let changes = creation_changes("backlog", "First story");
        let record = changes
            .into_record(Uuid::new_v4(), None, ActivityAction::Created, Utc::now())
            .unwrap();
        assert_eq!(record.change_count, 2);
        assert_eq!(
            record.details,
            "Status: None → backlog\nTitle: None → First story"
        );
        assert_eq!(record.action, ActivityAction::Created);
    }

    #[test]
    fn literal_none_string_compares_equal_to_absent() {
        let mut changes = ChangeSet::new();
        changes.record("Reviewer", Some("None".into()), None);
        assert!(changes.is_empty());
    }
}
