//! Backlog item model.
//!
//! A roadmap item is a unit of backlog work: an effort estimate in
//! points, a priority rank, and optional placement hints. Items are
//! ingested from several source collections (artifacts, feasibility
//! assessments, ideation, manual entry) and scheduled onto
//! (team, sprint) slots as [`Segment`](super::Segment)s.

use serde::{Deserialize, Serialize};

/// Item identity. Integer IDs double as the deterministic tie-break
/// for equal priority ranks.
pub type ItemId = u64;

/// A unit of backlog work to be scheduled.
///
/// # Priority Convention
/// **Lower rank = scheduled earlier.** Rank 1 is the top of the
/// backlog. Equal ranks fall back to ascending item ID so output is
/// reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapItem {
    /// Unique item identifier.
    pub id: ItemId,
    /// Human-readable title.
    pub title: String,
    /// Effort estimate in points.
    pub effort: u32,
    /// Priority rank (lower = earlier).
    pub priority: u32,
    /// Which backlog collection the item came from.
    pub source: ItemSource,
    /// Preferred team (0-based index). `None` = any team.
    pub team_hint: Option<u32>,
    /// Expected sprint span, as estimated at ingestion. Carried for
    /// the planning UI; placement derives actual spans from capacity.
    pub span_hint: Option<u32>,
}

/// Where a backlog item originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSource {
    /// Derived from a product artifact.
    Artifact,
    /// Derived from a feasibility assessment.
    Feasibility,
    /// Derived from an ideation session.
    Idea,
    /// Entered by hand.
    Manual,
}

impl RoadmapItem {
    /// Creates a new item with the given ID.
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            title: String::new(),
            effort: 0,
            priority: 0,
            source: ItemSource::Manual,
            team_hint: None,
            span_hint: None,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the effort estimate in points.
    pub fn with_effort(mut self, points: u32) -> Self {
        self.effort = points;
        self
    }

    /// Sets the priority rank (lower = earlier).
    pub fn with_priority(mut self, rank: u32) -> Self {
        self.priority = rank;
        self
    }

    /// Sets the source collection.
    pub fn with_source(mut self, source: ItemSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the preferred team (0-based index).
    pub fn with_team_hint(mut self, team: u32) -> Self {
        self.team_hint = Some(team);
        self
    }

    /// Sets the expected sprint span.
    pub fn with_span_hint(mut self, sprints: u32) -> Self {
        self.span_hint = Some(sprints);
        self
    }

    /// Whether the item carries a non-zero estimate.
    pub fn is_estimated(&self) -> bool {
        self.effort > 0
    }
}
