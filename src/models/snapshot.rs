//! Scheduling input snapshot.
//!
//! The surrounding service assembles a [`RoadmapSnapshot`] from one
//! consistent read of a roadmap session — items, dependency edges,
//! existing segments, and capacity configuration — and hands it to
//! [`recompute_schedule`](crate::recompute_schedule). The core never
//! reads storage itself.

use serde::{Deserialize, Serialize};

use super::{Dependency, ItemId, RoadmapItem, Segment};

/// Default bounded search window, in sprints.
pub const DEFAULT_HORIZON: u32 = 104;

/// An immutable image of a roadmap session at scheduling time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapSnapshot {
    /// Backlog items.
    pub items: Vec<RoadmapItem>,
    /// Dependency edges over the items.
    pub dependencies: Vec<Dependency>,
    /// Currently persisted segments. Manual ones are immutable inputs;
    /// auto ones are replaced by the run.
    pub segments: Vec<Segment>,
    /// Number of teams (team indices are `0..team_count`).
    pub team_count: u32,
    /// Per-team-per-sprint point budget.
    pub capacity: SprintCapacity,
    /// How many sprints ahead placement may search.
    pub horizon: u32,
}

/// Per-team-per-sprint point budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SprintCapacity {
    /// Every team has the same budget each sprint.
    Uniform(u32),
    /// Budget per team index.
    PerTeam(Vec<u32>),
}

impl SprintCapacity {
    /// Budget for a team. Out-of-range team indices have no budget.
    pub fn for_team(&self, team: u32) -> u32 {
        match self {
            Self::Uniform(points) => *points,
            Self::PerTeam(budgets) => budgets.get(team as usize).copied().unwrap_or(0),
        }
    }
}

impl RoadmapSnapshot {
    /// Creates an empty snapshot.
    pub fn new(team_count: u32, capacity: SprintCapacity) -> Self {
        Self {
            items: Vec::new(),
            dependencies: Vec::new(),
            segments: Vec::new(),
            team_count,
            capacity,
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Adds an item.
    pub fn with_item(mut self, item: RoadmapItem) -> Self {
        self.items.push(item);
        self
    }

    /// Adds a dependency edge.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Adds an existing segment.
    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Sets the placement search window.
    pub fn with_horizon(mut self, sprints: u32) -> Self {
        self.horizon = sprints;
        self
    }

    /// The manually positioned segments among the persisted set.
    pub fn manual_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.is_manual())
    }

    /// Looks up an item by ID.
    pub fn item(&self, id: ItemId) -> Option<&RoadmapItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SegmentKind;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = RoadmapSnapshot::new(2, SprintCapacity::Uniform(10))
            .with_item(RoadmapItem::new(1).with_effort(3))
            .with_dependency(Dependency::internal(1, 2))
            .with_segment(Segment::manual(1, 0, 1, 3))
            .with_horizon(26);

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.dependencies.len(), 1);
        assert_eq!(snapshot.segments.len(), 1);
        assert_eq!(snapshot.team_count, 2);
        assert_eq!(snapshot.horizon, 26);
        assert!(snapshot.item(1).is_some());
        assert!(snapshot.item(9).is_none());
    }

    #[test]
    fn test_manual_segment_filter() {
        let snapshot = RoadmapSnapshot::new(1, SprintCapacity::Uniform(5))
            .with_segment(Segment::manual(1, 0, 1, 2))
            .with_segment(Segment::auto(2, 0, 1, 2));

        let manual: Vec<_> = snapshot.manual_segments().collect();
        assert_eq!(manual.len(), 1);
        assert_eq!(manual[0].kind, SegmentKind::Manual);
    }

    #[test]
    fn test_capacity_lookup() {
        let uniform = SprintCapacity::Uniform(8);
        assert_eq!(uniform.for_team(0), 8);
        assert_eq!(uniform.for_team(3), 8);

        let per_team = SprintCapacity::PerTeam(vec![5, 12]);
        assert_eq!(per_team.for_team(0), 5);
        assert_eq!(per_team.for_team(1), 12);
        assert_eq!(per_team.for_team(2), 0);
    }

    #[test]
    fn test_snapshot_from_json() {
        // Snapshots arrive from the service layer as structured data.
        let json = r#"{
            "items": [
                {"id": 1, "title": "Auth", "effort": 3, "priority": 1,
                 "source": "Artifact", "team_hint": null, "span_hint": null}
            ],
            "dependencies": [
                {"External": {"from": 1, "description": "SSO contract", "resolved": false}}
            ],
            "segments": [],
            "team_count": 1,
            "capacity": {"Uniform": 5},
            "horizon": 104
        }"#;

        let snapshot: RoadmapSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.items[0].effort, 3);
        assert!(snapshot.dependencies[0].is_unresolved_external());
        assert_eq!(snapshot.capacity.for_team(0), 5);
    }
}
