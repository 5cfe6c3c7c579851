//! Fallible-API error types.
//!
//! Two failure layers exist. Structural invalidity — an input that
//! references items that do not exist, or a degenerate configuration —
//! rejects the whole run before scheduling begins and surfaces here.
//! Everything the scheduler can work around (cycles during a recompute,
//! blocked items, overloaded cells) is returned as
//! [`Conflict`](crate::models::Conflict) data instead, so the caller
//! can always render whatever was successfully scheduled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ItemId;
use crate::validation::ValidationError;

/// The dependency graph contains at least one cycle.
///
/// Returned by [`validate_dependencies`](crate::validate_dependencies)
/// so the service layer can refuse the edge mutation that would create
/// the cycle. Each inner vector is one cycle in dependency order,
/// rotated to start at its smallest member.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("dependency cycle detected: {}", render_cycles(.cycles))]
pub struct CycleError {
    pub cycles: Vec<Vec<ItemId>>,
}

fn render_cycles(cycles: &[Vec<ItemId>]) -> String {
    let rendered: Vec<String> = cycles
        .iter()
        .map(|cycle| {
            let mut ids: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
            if let Some(first) = ids.first().cloned() {
                ids.push(first);
            }
            ids.join(" -> ")
        })
        .collect();
    rendered.join("; ")
}

/// Failure to build or order the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A dependency edge references an item that is not in the backlog.
    #[error("dependency references unknown item {item_id}")]
    UnknownItem { item_id: ItemId },

    /// Two backlog items share an ID.
    #[error("duplicate item id {item_id}")]
    DuplicateItem { item_id: ItemId },

    /// The graph is cyclic.
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

/// Top-level failure returned by
/// [`recompute_schedule`](crate::recompute_schedule).
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot failed structural validation. Carries every
    /// detected problem, not just the first.
    #[error("snapshot rejected: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),

    /// The dependency edge set could not be resolved against the
    /// backlog.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn summarize(errors: &[ValidationError]) -> String {
    let mut parts: Vec<&str> = errors.iter().take(3).map(|e| e.message.as_str()).collect();
    if errors.len() > 3 {
        parts.push("...");
    }
    format!("{} problem(s): {}", errors.len(), parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_cycle_error_display() {
        let err = CycleError {
            cycles: vec![vec![1, 2, 3]],
        };
        assert_eq!(err.to_string(), "dependency cycle detected: 1 -> 2 -> 3 -> 1");
    }

    #[test]
    fn test_multiple_cycles_display() {
        let err = CycleError {
            cycles: vec![vec![1, 2], vec![5, 6]],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle detected: 1 -> 2 -> 1; 5 -> 6 -> 5"
        );
    }

    #[test]
    fn test_snapshot_error_summary() {
        let err = SnapshotError::Invalid(vec![ValidationError::new(
            ValidationErrorKind::UnknownItemReference,
            "dependency references unknown item 9",
        )]);
        assert_eq!(
            err.to_string(),
            "snapshot rejected: 1 problem(s): dependency references unknown item 9"
        );
    }
}
