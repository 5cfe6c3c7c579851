//! Structural validation of a scheduling snapshot.
//!
//! Checks referential integrity of items, dependencies, and segments
//! before scheduling. Detects:
//! - Duplicate item IDs
//! - Dependency edges referencing unknown items
//! - Segments referencing unknown items or out-of-range teams
//! - Degenerate sprint ranges and capacity configuration
//!
//! These are the only problems that abort a scheduling run; anything
//! the scheduler can work around is reported as a
//! [`Conflict`](crate::models::Conflict) instead.

use std::collections::HashSet;

use crate::models::{ItemId, RoadmapSnapshot, SprintCapacity};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two items share the same ID.
    DuplicateId,
    /// A dependency or segment references an item that doesn't exist.
    UnknownItemReference,
    /// A segment or team hint names a team ≥ `team_count`.
    TeamOutOfRange,
    /// A segment has a zero start sprint or zero sprint count.
    InvalidSprintRange,
    /// Zero teams, zero horizon, or a per-team budget list of the
    /// wrong length.
    InvalidConfiguration,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a snapshot before scheduling.
///
/// Checks:
/// 1. `team_count` ≥ 1, `horizon` ≥ 1, per-team budget length matches
/// 2. No duplicate item IDs
/// 3. All dependency endpoints point to existing items
/// 4. All segments point to existing items, in-range teams, and
///    non-degenerate sprint ranges
/// 5. All team hints are in range
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(snapshot: &RoadmapSnapshot) -> ValidationResult {
    let mut errors = Vec::new();

    if snapshot.team_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfiguration,
            "team_count must be at least 1",
        ));
    }
    if snapshot.horizon == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidConfiguration,
            "horizon must be at least 1 sprint",
        ));
    }
    if let SprintCapacity::PerTeam(budgets) = &snapshot.capacity {
        if budgets.len() != snapshot.team_count as usize {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidConfiguration,
                format!(
                    "per-team capacity lists {} team(s) but team_count is {}",
                    budgets.len(),
                    snapshot.team_count
                ),
            ));
        }
    }

    // Collect item IDs
    let mut item_ids: HashSet<ItemId> = HashSet::new();
    for item in &snapshot.items {
        if !item_ids.insert(item.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate item ID: {}", item.id),
            ));
        }
        if let Some(team) = item.team_hint {
            if team >= snapshot.team_count {
                errors.push(ValidationError::new(
                    ValidationErrorKind::TeamOutOfRange,
                    format!(
                        "Item {} hints team {} but team_count is {}",
                        item.id, team, snapshot.team_count
                    ),
                ));
            }
        }
    }

    // Check dependency references
    for dep in &snapshot.dependencies {
        let from = dep.from_item();
        if !item_ids.contains(&from) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownItemReference,
                format!("Dependency references unknown item {from}"),
            ));
        }
        if let Some(to) = dep.internal_target() {
            if !item_ids.contains(&to) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownItemReference,
                    format!("Dependency references unknown item {to}"),
                ));
            }
        }
    }

    // Check segment references and ranges
    for seg in &snapshot.segments {
        if !item_ids.contains(&seg.item_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownItemReference,
                format!("Segment references unknown item {}", seg.item_id),
            ));
        }
        if seg.team >= snapshot.team_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::TeamOutOfRange,
                format!(
                    "Segment for item {} sits on team {} but team_count is {}",
                    seg.item_id, seg.team, snapshot.team_count
                ),
            ));
        }
        if seg.start_sprint == 0 || seg.sprint_count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSprintRange,
                format!(
                    "Segment for item {} has sprint range {}+{} (sprints are 1-based, spans >= 1)",
                    seg.item_id, seg.start_sprint, seg.sprint_count
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
