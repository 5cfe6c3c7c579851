//! Schedule summary views.
//!
//! Derives the user-facing diagnostics from a finished run: per-cell
//! utilization against budget, the dependency graph in renderable
//! node/edge form, and each blocked item with the chain of unmet
//! prerequisites back to its root cause.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::capacity::split_shares;
use crate::models::{
    BlockReason, Conflict, Dependency, ItemId, RoadmapItem, Segment, SprintCapacity,
};

/// Load on one (team, sprint) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUtilization {
    pub team: u32,
    pub sprint: u32,
    pub used_points: u32,
    pub budget_points: u32,
}

impl CellUtilization {
    /// Used fraction of the budget. `None` for a zero-budget cell.
    pub fn ratio(&self) -> Option<f64> {
        if self.budget_points == 0 {
            return None;
        }
        Some(self.used_points as f64 / self.budget_points as f64)
    }
}

/// A backlog item as a renderable graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: ItemId,
    pub title: String,
    pub effort: u32,
    pub priority: u32,
}

/// An internal prerequisite edge: `from` waits for `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: ItemId,
    pub to: ItemId,
}

/// An out-of-system prerequisite, rendered as a dangling edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEdge {
    pub from: ItemId,
    pub description: Option<String>,
    pub resolved: bool,
}

/// The dependency graph in node/edge form for visualization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub external_edges: Vec<ExternalEdge>,
}

/// A blocked item and the prerequisite chain explaining why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedItem {
    pub item_id: ItemId,
    pub reason: BlockReason,
    /// The item itself, then each unscheduled prerequisite down to
    /// the root cause.
    pub chain: Vec<ItemId>,
}

/// Summary views over a finished scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Every (team, sprint) cell up to the last scheduled sprint,
    /// ordered by team then sprint.
    pub utilization: Vec<CellUtilization>,
    /// Renderable dependency graph.
    pub graph: GraphView,
    /// Blocked items with their prerequisite chains.
    pub blocked: Vec<BlockedItem>,
    /// Latest occupied sprint (0 when nothing is scheduled).
    pub last_sprint: u32,
}

impl ScheduleReport {
    /// Derives the report from a run's inputs and outputs.
    pub fn build(
        items: &[RoadmapItem],
        dependencies: &[Dependency],
        segments: &[Segment],
        conflicts: &[Conflict],
        team_count: u32,
        capacity: &SprintCapacity,
    ) -> Self {
        let last_sprint = segments.iter().map(Segment::end_sprint).max().unwrap_or(0);

        // Per-cell load, split the same way capacity accounting splits.
        let mut used: BTreeMap<(u32, u32), u32> = BTreeMap::new();
        for seg in segments {
            let shares = split_shares(seg.effort, seg.sprint_count);
            for (offset, share) in shares.into_iter().enumerate() {
                *used
                    .entry((seg.team, seg.start_sprint + offset as u32))
                    .or_insert(0) += share;
            }
        }

        let mut utilization = Vec::new();
        for team in 0..team_count {
            for sprint in 1..=last_sprint {
                utilization.push(CellUtilization {
                    team,
                    sprint,
                    used_points: used.get(&(team, sprint)).copied().unwrap_or(0),
                    budget_points: capacity.for_team(team),
                });
            }
        }

        let mut nodes: Vec<GraphNode> = items
            .iter()
            .map(|item| GraphNode {
                id: item.id,
                title: item.title.clone(),
                effort: item.effort,
                priority: item.priority,
            })
            .collect();
        nodes.sort_by_key(|n| n.id);

        let mut edges = Vec::new();
        let mut external_edges = Vec::new();
        for dep in dependencies {
            match dep {
                Dependency::Internal { from, to } => edges.push(GraphEdge {
                    from: *from,
                    to: *to,
                }),
                Dependency::External {
                    from,
                    description,
                    resolved,
                } => external_edges.push(ExternalEdge {
                    from: *from,
                    description: description.clone(),
                    resolved: *resolved,
                }),
            }
        }

        let blocked = blocked_chains(conflicts);

        Self {
            utilization,
            graph: GraphView {
                nodes,
                edges,
                external_edges,
            },
            blocked,
            last_sprint,
        }
    }

    /// Load on one cell, if it is inside the reported window.
    pub fn utilization_for(&self, team: u32, sprint: u32) -> Option<&CellUtilization> {
        self.utilization
            .iter()
            .find(|c| c.team == team && c.sprint == sprint)
    }

    /// Mean used/budget ratio across budgeted cells.
    pub fn avg_utilization(&self) -> f64 {
        let ratios: Vec<f64> = self.utilization.iter().filter_map(|c| c.ratio()).collect();
        if ratios.is_empty() {
            return 0.0;
        }
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}

/// Expands each `Blocked` conflict into a chain: the item, then every
/// unscheduled prerequisite down to the root cause.
fn blocked_chains(conflicts: &[Conflict]) -> Vec<BlockedItem> {
    let reasons: HashMap<ItemId, &BlockReason> = conflicts
        .iter()
        .filter_map(|c| match c {
            Conflict::Blocked { item_id, reason } => Some((*item_id, reason)),
            _ => None,
        })
        .collect();

    let mut blocked = Vec::new();
    for conflict in conflicts {
        let Conflict::Blocked { item_id, reason } = conflict else {
            continue;
        };
        let mut chain = vec![*item_id];
        let mut seen: HashSet<ItemId> = chain.iter().copied().collect();
        let mut cursor = reason;
        while let BlockReason::PrerequisiteUnscheduled { prerequisite } = cursor {
            if !seen.insert(*prerequisite) {
                break;
            }
            chain.push(*prerequisite);
            match reasons.get(prerequisite) {
                Some(next) => cursor = *next,
                // Root cause without its own Blocked entry, e.g. a
                // cycle member.
                None => break,
            }
        }
        blocked.push(BlockedItem {
            item_id: *item_id,
            reason: reason.clone(),
            chain,
        });
    }
    blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoadmapItem;

    fn items() -> Vec<RoadmapItem> {
        vec![
            RoadmapItem::new(1).with_title("Auth").with_effort(3).with_priority(1),
            RoadmapItem::new(2).with_title("Billing").with_effort(4).with_priority(2),
        ]
    }

    #[test]
    fn test_utilization_grid() {
        let segments = vec![
            Segment::auto(1, 0, 1, 3),
            Segment::auto(2, 0, 2, 4),
        ];
        let report = ScheduleReport::build(
            &items(),
            &[],
            &segments,
            &[],
            1,
            &SprintCapacity::Uniform(5),
        );

        assert_eq!(report.last_sprint, 2);
        assert_eq!(report.utilization.len(), 2);
        let first = report.utilization_for(0, 1).unwrap();
        assert_eq!((first.used_points, first.budget_points), (3, 5));
        assert_eq!(first.ratio(), Some(0.6));
        let second = report.utilization_for(0, 2).unwrap();
        assert_eq!(second.used_points, 4);
    }

    #[test]
    fn test_spanning_segment_splits_across_cells() {
        let segments = vec![Segment::manual(1, 0, 1, 5).with_span(2)];
        let report = ScheduleReport::build(
            &items(),
            &[],
            &segments,
            &[],
            1,
            &SprintCapacity::Uniform(5),
        );

        assert_eq!(report.utilization_for(0, 1).unwrap().used_points, 2);
        assert_eq!(report.utilization_for(0, 2).unwrap().used_points, 3);
    }

    #[test]
    fn test_graph_view() {
        let deps = vec![
            Dependency::internal(2, 1),
            Dependency::external(1).with_description("SSO contract"),
        ];
        let report =
            ScheduleReport::build(&items(), &deps, &[], &[], 1, &SprintCapacity::Uniform(5));

        assert_eq!(report.graph.nodes.len(), 2);
        assert_eq!(report.graph.nodes[0].id, 1);
        assert_eq!(report.graph.edges, vec![GraphEdge { from: 2, to: 1 }]);
        assert_eq!(report.graph.external_edges.len(), 1);
        assert_eq!(
            report.graph.external_edges[0].description.as_deref(),
            Some("SSO contract")
        );
    }

    #[test]
    fn test_blocked_chain_to_root_cause() {
        // 3 waits on 2, 2 waits on 1, 1 waits on the outside world.
        let conflicts = vec![
            Conflict::Blocked {
                item_id: 1,
                reason: BlockReason::ExternalPrerequisite { description: None },
            },
            Conflict::Blocked {
                item_id: 2,
                reason: BlockReason::PrerequisiteUnscheduled { prerequisite: 1 },
            },
            Conflict::Blocked {
                item_id: 3,
                reason: BlockReason::PrerequisiteUnscheduled { prerequisite: 2 },
            },
        ];
        let report =
            ScheduleReport::build(&items(), &[], &[], &conflicts, 1, &SprintCapacity::Uniform(5));

        assert_eq!(report.blocked.len(), 3);
        let deepest = &report.blocked[2];
        assert_eq!(deepest.item_id, 3);
        assert_eq!(deepest.chain, vec![3, 2, 1]);
    }

    #[test]
    fn test_empty_report() {
        let report =
            ScheduleReport::build(&[], &[], &[], &[], 1, &SprintCapacity::Uniform(5));
        assert_eq!(report.last_sprint, 0);
        assert!(report.utilization.is_empty());
        assert_eq!(report.avg_utilization(), 0.0);
    }

    #[test]
    fn test_avg_utilization() {
        let segments = vec![
            Segment::auto(1, 0, 1, 5),
            Segment::auto(2, 1, 1, 0),
        ];
        let report = ScheduleReport::build(
            &items(),
            &[],
            &segments,
            &[],
            2,
            &SprintCapacity::Uniform(5),
        );
        // Team 0 full, team 1 idle.
        assert_eq!(report.avg_utilization(), 0.5);
    }
}
