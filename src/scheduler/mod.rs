//! Scheduling pipeline and entry point.
//!
//! [`recompute_schedule`] runs the full pass over a snapshot:
//!
//! 1. Structural validation (the only failure that aborts).
//! 2. Dependency graph build and topological ordering.
//! 3. Capacity grid seeded with manually positioned segments.
//! 4. [`AutoScheduler`] places every non-pinned item.
//! 5. [`reconcile`] merges the fresh auto segments with the pinned set.
//! 6. [`ScheduleReport`] derives the summary views.
//!
//! The pass is pure and deterministic: the same snapshot always yields
//! the same [`ScheduleOutcome`], so the caller may re-run it on every
//! backlog change and persist the result wholesale.

mod auto;
mod reconcile;
mod report;

pub use auto::{AutoScheduleResult, AutoScheduler};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use report::{
    BlockedItem, CellUtilization, ExternalEdge, GraphEdge, GraphNode, GraphView, ScheduleReport,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::capacity::CapacityGrid;
use crate::error::SnapshotError;
use crate::graph::DependencyGraph;
use crate::models::{Conflict, ItemId, RoadmapSnapshot, Segment};
use crate::validation;

/// A complete scheduling result: the merged segment set, everything
/// that needs user attention, and the derived summary views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Final segments: manual ones untouched, auto ones regenerated.
    pub segments: Vec<Segment>,
    /// Structured diagnostics; empty on a fully clean run.
    pub conflicts: Vec<Conflict>,
    /// Summary views for the planning UI.
    pub report: ScheduleReport,
}

impl ScheduleOutcome {
    /// All segments of one item.
    pub fn segments_for_item(&self, id: ItemId) -> Vec<&Segment> {
        self.segments.iter().filter(|s| s.item_id == id).collect()
    }

    /// Points scheduled for one item across all its segments.
    pub fn effort_scheduled(&self, id: ItemId) -> u32 {
        self.segments_for_item(id).iter().map(|s| s.effort).sum()
    }

    /// Whether the run produced no conflicts.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Recomputes the schedule for one roadmap session.
///
/// Invoked on demand and whenever backlog composition changes. The
/// caller supplies a consistent snapshot and persists the returned
/// segments; no I/O happens here.
///
/// # Errors
/// [`SnapshotError`] only for structurally invalid input. Cycles,
/// blocked items, and overloaded cells come back as
/// [`Conflict`](crate::models::Conflict)s next to the best-effort
/// partial schedule.
pub fn recompute_schedule(snapshot: &RoadmapSnapshot) -> Result<ScheduleOutcome, SnapshotError> {
    validation::validate_snapshot(snapshot).map_err(SnapshotError::Invalid)?;

    let graph = DependencyGraph::build(&snapshot.items, &snapshot.dependencies)?;
    let topo = graph.topo_order();

    let mut grid = CapacityGrid::new(snapshot.team_count, snapshot.capacity.clone());
    grid.seed_manual(&snapshot.segments);

    let auto = AutoScheduler::new(snapshot.horizon).schedule(
        &snapshot.items,
        &graph,
        &topo,
        &mut grid,
        &snapshot.segments,
    );

    let merged = reconcile(&snapshot.segments, auto.segments, &snapshot.capacity);

    let mut conflicts = auto.conflicts;
    conflicts.extend(merged.conflicts);

    let report = ScheduleReport::build(
        &snapshot.items,
        &snapshot.dependencies,
        &merged.segments,
        &conflicts,
        snapshot.team_count,
        &snapshot.capacity,
    );

    info!(
        items = snapshot.items.len(),
        segments = merged.segments.len(),
        conflicts = conflicts.len(),
        "schedule recomputed"
    );

    Ok(ScheduleOutcome {
        segments: merged.segments,
        conflicts,
        report,
    })
}
