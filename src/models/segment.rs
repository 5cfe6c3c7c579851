//! Segment (placement) model.
//!
//! A segment places all or part of an item's effort onto one team for
//! a contiguous sprint range. An item split across sprints or teams
//! owns several segments; their efforts sum to the item's estimate.
//!
//! Manual vs. auto placement is a variant, not a flag: the reconciler
//! regenerates [`SegmentKind::Auto`] segments wholesale on every run
//! and never touches [`SegmentKind::Manual`] ones.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A scheduled placement of (part of) an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// The item this segment belongs to.
    pub item_id: ItemId,
    /// Assigned team (0-based index).
    pub team: u32,
    /// First occupied sprint (1-based).
    pub start_sprint: u32,
    /// Number of consecutive sprints occupied (≥ 1).
    pub sprint_count: u32,
    /// Effort points allocated to this segment.
    pub effort: u32,
    /// Display ordering among segments sharing a (team, sprint) cell.
    pub sequence_order: u32,
    /// Vertical lane for overlap-free rendering.
    pub row_index: u32,
    /// Execution status.
    pub status: SegmentStatus,
    /// How the segment was placed.
    pub kind: SegmentKind,
    /// Display label override.
    pub label: Option<String>,
    /// Display color override.
    pub color: Option<String>,
}

/// How a segment came to occupy its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Pinned by the user; immutable to the scheduler.
    Manual,
    /// Generated by the auto-scheduler; replaced on every run.
    Auto,
}

/// Execution status of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentStatus {
    Planned,
    InProgress,
    Done,
}

impl Segment {
    fn new(kind: SegmentKind, item_id: ItemId, team: u32, start_sprint: u32, effort: u32) -> Self {
        Self {
            item_id,
            team,
            start_sprint,
            sprint_count: 1,
            effort,
            sequence_order: 0,
            row_index: 0,
            status: SegmentStatus::Planned,
            kind,
            label: None,
            color: None,
        }
    }

    /// Creates a one-sprint auto-generated segment.
    pub fn auto(item_id: ItemId, team: u32, start_sprint: u32, effort: u32) -> Self {
        Self::new(SegmentKind::Auto, item_id, team, start_sprint, effort)
    }

    /// Creates a one-sprint manually positioned segment.
    pub fn manual(item_id: ItemId, team: u32, start_sprint: u32, effort: u32) -> Self {
        Self::new(SegmentKind::Manual, item_id, team, start_sprint, effort)
    }

    /// Sets the sprint span.
    pub fn with_span(mut self, sprint_count: u32) -> Self {
        self.sprint_count = sprint_count;
        self
    }

    /// Sets the display sequence within a cell.
    pub fn with_sequence(mut self, order: u32) -> Self {
        self.sequence_order = order;
        self
    }

    /// Sets the vertical lane.
    pub fn with_row(mut self, row: u32) -> Self {
        self.row_index = row;
        self
    }

    /// Sets the execution status.
    pub fn with_status(mut self, status: SegmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the display label override.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the display color override.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Last occupied sprint (inclusive).
    #[inline]
    pub fn end_sprint(&self) -> u32 {
        self.start_sprint + self.sprint_count - 1
    }

    /// Iterates the occupied sprint indices.
    pub fn sprints(&self) -> impl Iterator<Item = u32> {
        self.start_sprint..=self.end_sprint()
    }

    /// Whether the placement was pinned by the user.
    #[inline]
    pub fn is_manual(&self) -> bool {
        self.kind == SegmentKind::Manual
    }

    /// Whether two segments occupy intersecting sprint ranges on the
    /// same team.
    pub fn overlaps_on_team(&self, other: &Segment) -> bool {
        self.team == other.team
            && self.start_sprint <= other.end_sprint()
            && other.start_sprint <= self.end_sprint()
    }
}
