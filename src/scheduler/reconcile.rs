//! Segment reconciliation.
//!
//! Merges a fresh auto-scheduling pass with the persisted segment set:
//! manually positioned segments are carried over untouched, the old
//! auto segments are dropped wholesale in favor of the new ones.
//!
//! Sharing a (team, sprint) cell with a manual segment is normal —
//! the capacity grid was seeded with manual usage, so the scheduler
//! packs around it. The conflict worth flagging is an *overloaded*
//! shared cell: combined load above the budget, which can only happen
//! when a manual segment moved after the grid was seeded. Such cells
//! are reported for user resolution and a re-run; the manual segment
//! is never moved.

use std::collections::BTreeMap;

use tracing::warn;

use crate::capacity::split_shares;
use crate::models::{Conflict, ItemId, Segment, SprintCapacity};

/// Result of merging manual and auto segments.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Final segment set, ordered by (team, sprint, sequence, item).
    pub segments: Vec<Segment>,
    /// Overloaded cells shared with a manual segment.
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Default)]
struct CellLoad {
    manual_points: u32,
    auto_points: u32,
    manual_items: Vec<ItemId>,
    auto_items: Vec<ItemId>,
}

/// Merges `auto_segments` with the manual segments in `existing`.
pub fn reconcile(
    existing: &[Segment],
    auto_segments: Vec<Segment>,
    capacity: &SprintCapacity,
) -> ReconcileOutcome {
    let mut segments: Vec<Segment> = existing
        .iter()
        .filter(|s| s.is_manual())
        .cloned()
        .collect();
    segments.extend(auto_segments);

    let mut cells: BTreeMap<(u32, u32), CellLoad> = BTreeMap::new();
    for seg in &segments {
        let shares = split_shares(seg.effort, seg.sprint_count);
        for (offset, share) in shares.into_iter().enumerate() {
            let cell = cells
                .entry((seg.team, seg.start_sprint + offset as u32))
                .or_default();
            if seg.is_manual() {
                cell.manual_points += share;
                if !cell.manual_items.contains(&seg.item_id) {
                    cell.manual_items.push(seg.item_id);
                }
            } else {
                cell.auto_points += share;
                if !cell.auto_items.contains(&seg.item_id) {
                    cell.auto_items.push(seg.item_id);
                }
            }
        }
    }

    let mut conflicts = Vec::new();
    for (&(team, sprint), load) in &cells {
        let budget = capacity.for_team(team);
        let used = load.manual_points + load.auto_points;
        if !load.manual_items.is_empty() && used > budget {
            warn!(team, sprint, used, budget, "manual segment overloads cell");
            conflicts.push(Conflict::ManualOverlap {
                team,
                sprint,
                manual_items: load.manual_items.clone(),
                auto_items: load.auto_items.clone(),
                used_points: used,
                budget_points: budget,
            });
        }
    }

    segments.sort_by_key(|s| (s.team, s.start_sprint, s.sequence_order, s.item_id));

    ReconcileOutcome {
        segments,
        conflicts,
    }
}
