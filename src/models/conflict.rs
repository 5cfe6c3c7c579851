//! Scheduling conflicts.
//!
//! Conflicts are structured diagnostics returned alongside the
//! best-effort schedule — they are data, not errors. Every variant
//! carries enough to render a user-facing explanation and to emit a
//! fully-qualified `tracing` event without further lookups.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A problem the scheduler detected but did not abort on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// A dependency cycle. Its members are excluded from scheduling;
    /// unrelated components still schedule.
    CycleDetected { cycle: Vec<ItemId> },

    /// An item could not be placed.
    Blocked { item_id: ItemId, reason: BlockReason },

    /// A manually positioned segment shares a (team, sprint) cell
    /// whose combined load exceeds the budget. Only possible when a
    /// manual segment moved after capacity was seeded; resolved by
    /// the user, never by silently moving the manual segment.
    ManualOverlap {
        team: u32,
        sprint: u32,
        manual_items: Vec<ItemId>,
        auto_items: Vec<ItemId>,
        used_points: u32,
        budget_points: u32,
    },

    /// A pinned item whose manual segments do not sum to its effort
    /// estimate.
    EffortMismatch {
        item_id: ItemId,
        allocated: u32,
        estimate: u32,
    },
}

/// Why an item was left unplaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// An unresolved out-of-system prerequisite.
    ExternalPrerequisite { description: Option<String> },

    /// A prerequisite item is itself unscheduled (blocked or cyclic
    /// upstream).
    PrerequisiteUnscheduled { prerequisite: ItemId },

    /// No (team, sprint) combination within the search horizon had
    /// room for the item's effort.
    CapacityExhausted { horizon: u32 },
}

impl Conflict {
    /// The item a per-item conflict refers to, if any.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Self::Blocked { item_id, .. } | Self::EffortMismatch { item_id, .. } => Some(*item_id),
            Self::CycleDetected { .. } | Self::ManualOverlap { .. } => None,
        }
    }

    /// Whether this conflict blocks an item from being scheduled.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::CycleDetected { .. })
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::CycleDetected { cycle } => {
                write!(f, "dependency cycle: ")?;
                for id in cycle {
                    write!(f, "{id} -> ")?;
                }
                match cycle.first() {
                    Some(first) => write!(f, "{first}"),
                    None => Ok(()),
                }
            }
            Conflict::Blocked { item_id, reason } => {
                write!(f, "item {item_id} blocked: {reason}")
            }
            Conflict::ManualOverlap {
                team,
                sprint,
                used_points,
                budget_points,
                ..
            } => write!(
                f,
                "team {team} sprint {sprint} holds {used_points} points against a budget of \
                 {budget_points} alongside a manually positioned segment"
            ),
            Conflict::EffortMismatch {
                item_id,
                allocated,
                estimate,
            } => write!(
                f,
                "item {item_id} is pinned to {allocated} points but estimated at {estimate}"
            ),
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::ExternalPrerequisite { description } => match description {
                Some(text) => write!(f, "waiting on external prerequisite: {text}"),
                None => write!(f, "waiting on an external prerequisite"),
            },
            BlockReason::PrerequisiteUnscheduled { prerequisite } => {
                write!(f, "prerequisite item {prerequisite} is not scheduled")
            }
            BlockReason::CapacityExhausted { horizon } => {
                write!(f, "no capacity found within {horizon} sprints")
            }
        }
    }
}
