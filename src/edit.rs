//! Inline editing of the two mutable effort fields.
//!
//! Every visible item contributes two editable cells, Remaining then
//! Completed, so the flattened cell order is `[r0, c0, r1, c1, ...]` and
//! moving a row up or down skips two cells.

use crate::azure::fields;
use crate::filter::format_hours;
use crate::model::work_item::WorkItem;

pub const CELLS_PER_ITEM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    RemainingWork,
    CompletedWork,
}

impl EditField {
    pub const ALL: [EditField; CELLS_PER_ITEM] = [EditField::RemainingWork, EditField::CompletedWork];

    pub fn field_path(self) -> &'static str {
        match self {
            EditField::RemainingWork => fields::REMAINING_WORK,
            EditField::CompletedWork => fields::COMPLETED_WORK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditField::RemainingWork => "Remaining",
            EditField::CompletedWork => "Completed",
        }
    }

    pub fn value(self, item: &WorkItem) -> Option<f64> {
        match self {
            EditField::RemainingWork => item.remaining_work,
            EditField::CompletedWork => item.completed_work,
        }
    }

    pub fn set(self, item: &mut WorkItem, value: f64) {
        match self {
            EditField::RemainingWork => item.remaining_work = Some(value),
            EditField::CompletedWork => item.completed_work = Some(value),
        }
    }
}

/// Identity of one editable cell, independent of its screen position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub project_id: String,
    pub item_id: i64,
    pub field: EditField,
}

impl CellRef {
    pub fn for_item(item: &WorkItem, field: EditField) -> Self {
        Self {
            project_id: item.project_id.clone(),
            item_id: item.id,
            field,
        }
    }
}

/// Cell at a flattened index of the visible list.
pub fn cell_at(visible: &[&WorkItem], index: usize) -> Option<CellRef> {
    let item = visible.get(index / CELLS_PER_ITEM)?;
    Some(CellRef::for_item(item, EditField::ALL[index % CELLS_PER_ITEM]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
    Up,
    Down,
}

/// Index of the neighbouring editable cell, if there is one.
pub fn adjacent_cell(index: usize, direction: Direction, cell_count: usize) -> Option<usize> {
    let target = match direction {
        Direction::Next => index.checked_add(1)?,
        Direction::Prev => index.checked_sub(1)?,
        Direction::Up => index.checked_sub(CELLS_PER_ITEM)?,
        Direction::Down => index.checked_add(CELLS_PER_ITEM)?,
    };
    (target < cell_count).then_some(target)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("Hours cannot be negative")]
    Negative,

    #[error(
        "Remaining ({}) cannot exceed Original Estimate ({})",
        hours(.value),
        hours(.original_estimate)
    )]
    ExceedsOriginalEstimate { value: f64, original_estimate: f64 },
}

fn hours(value: &f64) -> String {
    format_hours(Some(*value))
}

impl ValidationError {
    /// Silent failures revert the cell like a cancel; the rest are reported.
    pub fn is_silent(&self) -> bool {
        matches!(self, ValidationError::NotANumber(_) | ValidationError::Negative)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commit {
    /// Same as the current value, nothing to send
    Unchanged,
    Persist(f64),
}

/// Decide what committing `input` means for a cell currently holding
/// `original`.
pub fn validate_commit(
    field: EditField,
    input: &str,
    original: Option<f64>,
    original_estimate: Option<f64>,
) -> Result<Commit, ValidationError> {
    let raw = input.trim();
    let value = if raw.is_empty() {
        0.0
    } else {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ValidationError::NotANumber(raw.to_string()))?
    };
    if value < 0.0 {
        return Err(ValidationError::Negative);
    }
    if original == Some(value) {
        return Ok(Commit::Unchanged);
    }
    if field == EditField::RemainingWork {
        if let Some(estimate) = original_estimate {
            if value > estimate {
                return Err(ValidationError::ExceedsOriginalEstimate {
                    value,
                    original_estimate: estimate,
                });
            }
        }
    }
    Ok(Commit::Persist(value))
}

/// One active cell edit. It stays alive while its value is being saved so
/// the optimistic value can be shown and reverted.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub cell: CellRef,
    /// The value before editing began
    pub original: Option<f64>,
    pub input: String,
    /// The whole input is selected; the next keystroke replaces it
    replace_on_type: bool,
    handled: bool,
    /// Value shown while the save is in flight
    pub pending: Option<f64>,
}

impl EditSession {
    pub fn begin(cell: CellRef, original: Option<f64>) -> Self {
        Self {
            cell,
            original,
            input: original.map(|v| v.to_string()).unwrap_or_default(),
            replace_on_type: true,
            handled: false,
            pending: None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.handled || !(c.is_ascii_digit() || c == '.' || c == '-') {
            return;
        }
        if self.replace_on_type {
            self.input.clear();
            self.replace_on_type = false;
        }
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        if self.handled {
            return;
        }
        if self.replace_on_type {
            self.input.clear();
            self.replace_on_type = false;
        } else {
            self.input.pop();
        }
    }

    pub fn is_selected(&self) -> bool {
        self.replace_on_type
    }

    /// Claim the one commit or cancel this session gets. Returns `false`
    /// when it was already claimed.
    pub fn mark_handled(&mut self) -> bool {
        if self.handled {
            return false;
        }
        self.handled = true;
        true
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// What the cell shows right now.
    pub fn display(&self) -> String {
        match self.pending {
            Some(v) => format_hours(Some(v)),
            None => self.input.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_item::sample_item;

    #[test]
    fn cells_alternate_remaining_then_completed() {
        let a = sample_item(1, "p");
        let b = sample_item(2, "p");
        let visible = vec![&a, &b];
        assert_eq!(
            cell_at(&visible, 0),
            Some(CellRef::for_item(&a, EditField::RemainingWork))
        );
        assert_eq!(
            cell_at(&visible, 3),
            Some(CellRef::for_item(&b, EditField::CompletedWork))
        );
        assert_eq!(cell_at(&visible, 4), None);
    }

    #[test]
    fn adjacent_moves_by_one_and_two() {
        assert_eq!(adjacent_cell(1, Direction::Next, 6), Some(2));
        assert_eq!(adjacent_cell(1, Direction::Prev, 6), Some(0));
        assert_eq!(adjacent_cell(3, Direction::Up, 6), Some(1));
        assert_eq!(adjacent_cell(3, Direction::Down, 6), Some(5));
    }

    #[test]
    fn adjacent_stops_at_edges() {
        assert_eq!(adjacent_cell(0, Direction::Prev, 6), None);
        assert_eq!(adjacent_cell(1, Direction::Up, 6), None);
        assert_eq!(adjacent_cell(5, Direction::Next, 6), None);
        assert_eq!(adjacent_cell(4, Direction::Down, 6), None);
        assert_eq!(adjacent_cell(0, Direction::Next, 0), None);
    }

    #[test]
    fn empty_input_commits_zero() {
        assert_eq!(
            validate_commit(EditField::CompletedWork, "", Some(3.0), None),
            Ok(Commit::Persist(0.0))
        );
        assert_eq!(
            validate_commit(EditField::CompletedWork, " ", None, None),
            Ok(Commit::Persist(0.0))
        );
    }

    #[test]
    fn non_numeric_and_negative_are_silent() {
        let err = validate_commit(EditField::CompletedWork, "abc", None, None).unwrap_err();
        assert!(err.is_silent());
        let err = validate_commit(EditField::CompletedWork, "-1", None, None).unwrap_err();
        assert_eq!(err, ValidationError::Negative);
        assert!(err.is_silent());
        let err = validate_commit(EditField::CompletedWork, "inf", None, None).unwrap_err();
        assert!(err.is_silent());
    }

    #[test]
    fn unchanged_value_is_not_persisted() {
        assert_eq!(
            validate_commit(EditField::RemainingWork, "4", Some(4.0), Some(10.0)),
            Ok(Commit::Unchanged)
        );
        assert_eq!(
            validate_commit(EditField::RemainingWork, "4.0", Some(4.0), None),
            Ok(Commit::Unchanged)
        );
    }

    #[test]
    fn remaining_cannot_exceed_original_estimate() {
        let err = validate_commit(EditField::RemainingWork, "15", Some(5.0), Some(10.0)).unwrap_err();
        assert!(!err.is_silent());
        assert_eq!(
            err.to_string(),
            "Remaining (15.0) cannot exceed Original Estimate (10.0)"
        );
    }

    #[test]
    fn completed_may_exceed_original_estimate() {
        assert_eq!(
            validate_commit(EditField::CompletedWork, "15", Some(5.0), Some(10.0)),
            Ok(Commit::Persist(15.0))
        );
    }

    #[test]
    fn remaining_without_estimate_is_unbounded() {
        assert_eq!(
            validate_commit(EditField::RemainingWork, "40", None, None),
            Ok(Commit::Persist(40.0))
        );
    }

    #[test]
    fn session_prefills_and_replaces_on_first_key() {
        let item = sample_item(1, "p");
        let cell = CellRef::for_item(&item, EditField::RemainingWork);
        let mut session = EditSession::begin(cell.clone(), Some(2.5));
        assert_eq!(session.input, "2.5");
        assert!(session.is_selected());
        session.insert_char('7');
        session.insert_char('x');
        session.insert_char('.');
        session.insert_char('5');
        assert_eq!(session.input, "7.5");
        session.backspace();
        assert_eq!(session.input, "7.");

        let empty = EditSession::begin(cell, None);
        assert_eq!(empty.input, "");
    }

    #[test]
    fn session_is_handled_once() {
        let item = sample_item(1, "p");
        let mut session =
            EditSession::begin(CellRef::for_item(&item, EditField::CompletedWork), None);
        assert!(session.mark_handled());
        assert!(!session.mark_handled());
        session.insert_char('3');
        assert_eq!(session.input, "");
    }

    #[test]
    fn display_prefers_pending_value() {
        let item = sample_item(1, "p");
        let mut session =
            EditSession::begin(CellRef::for_item(&item, EditField::CompletedWork), Some(1.0));
        assert_eq!(session.display(), "1");
        session.pending = Some(3.0);
        assert_eq!(session.display(), "3.0");
    }
}
