//! Sparse field changes proposed against an otherwise immutable task.

use super::{Priority, TaskDomainError};
use crate::identity::domain::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest accepted task title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Change to an optional field: leave it, set it, or clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldPatch<T> {
    /// Leave the field untouched.
    #[default]
    Keep,
    /// Replace the field value.
    Set(T),
    /// Remove the field value.
    Clear,
}

impl<T> FieldPatch<T> {
    /// Returns whether the patch leaves the field untouched.
    #[must_use]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Applies the patch to `field`.
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }
}

impl FieldPatch<String> {
    /// Trims a text value, turning a blank value into a clear.
    #[must_use]
    pub fn trimmed(self) -> Self {
        match self {
            Self::Set(value) if value.trim().is_empty() => Self::Clear,
            Self::Set(value) => Self::Set(value.trim().to_owned()),
            other => other,
        }
    }
}

/// A sparse partial record of task fields.
///
/// Any subset of title, description, due date, priority, and the assignee
/// set may be present. The assignee set, when present, is the complete
/// desired set rather than a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    description: FieldPatch<String>,
    #[serde(default, skip_serializing_if = "FieldPatch::is_keep")]
    due_date: FieldPatch<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assignees: Option<BTreeSet<UserId>>,
}

impl ProposedChanges {
    /// Creates an empty proposal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Proposes a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Proposes a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = FieldPatch::Set(description.into());
        self
    }

    /// Proposes removing the description.
    #[must_use]
    pub fn clearing_description(mut self) -> Self {
        self.description = FieldPatch::Clear;
        self
    }

    /// Proposes a new due date.
    #[must_use]
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = FieldPatch::Set(due_date);
        self
    }

    /// Proposes removing the due date.
    #[must_use]
    pub fn clearing_due_date(mut self) -> Self {
        self.due_date = FieldPatch::Clear;
        self
    }

    /// Proposes a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Proposes the complete desired assignee set.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = UserId>) -> Self {
        self.assignees = Some(assignees.into_iter().collect());
        self
    }

    /// Returns the proposed title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the description patch.
    #[must_use]
    pub const fn description(&self) -> &FieldPatch<String> {
        &self.description
    }

    /// Returns the due-date patch.
    #[must_use]
    pub const fn due_date(&self) -> &FieldPatch<NaiveDate> {
        &self.due_date
    }

    /// Returns the proposed priority.
    #[must_use]
    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Returns the proposed assignee set.
    #[must_use]
    pub const fn assignees(&self) -> Option<&BTreeSet<UserId>> {
        self.assignees.as_ref()
    }

    /// Returns whether any scalar task field is touched.
    #[must_use]
    pub const fn touches_fields(&self) -> bool {
        self.title.is_some()
            || !self.description.is_keep()
            || !self.due_date.is_keep()
            || self.priority.is_some()
    }

    /// Returns whether the proposal names no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.touches_fields() && self.assignees.is_none()
    }

    /// Validates the proposal shape.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyProposal`] when nothing is proposed,
    /// or a title error when the proposed title is invalid.
    pub fn validate(&self) -> Result<(), TaskDomainError> {
        if self.is_empty() {
            return Err(TaskDomainError::EmptyProposal);
        }
        if let Some(title) = &self.title {
            normalize_title(title)?;
        }
        Ok(())
    }
}

/// Trims and validates a task title.
///
/// # Errors
///
/// Returns [`TaskDomainError::EmptyTitle`] or
/// [`TaskDomainError::TitleTooLong`].
pub fn normalize_title(raw: &str) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    let length = trimmed.chars().count();
    if length > MAX_TITLE_CHARS {
        return Err(TaskDomainError::TitleTooLong {
            length,
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}
