//! Capacity-aware auto-scheduler.
//!
//! # Algorithm
//!
//! 1. Walk items in topological + priority order.
//! 2. Skip pinned items (any manual segment); their manual end sprint
//!    feeds dependents.
//! 3. For each remaining item, compute the earliest start sprint its
//!    prerequisites allow, then sweep `(start, span, team)`
//!    lexicographically — start ascending, span ascending, teams in
//!    preference order (hint first, then ascending index) — and take
//!    the first combination the capacity grid accepts. Start-sprint
//!    minimization always dominates; at a given start a single-sprint
//!    fit on any team beats splitting, and a split uses the minimum
//!    number of consecutive sprints; the team hint breaks the
//!    remaining ties.
//! 4. A multi-sprint placement emits one segment per sprint, effort
//!    split evenly with the remainder on the final segment.
//!
//! Items that cannot be placed — unresolved external prerequisite,
//! unscheduled prerequisite, no capacity within the horizon — are
//! reported as conflicts and left out of the segment set; their
//! dependents block in turn.
//!
//! # Complexity
//! O(items × horizon × teams × max-span) in the worst case; the span
//! sweep is capped by the item's effort, so realistic backlogs stay
//! far below the bound.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems",
//! Ch. 4: Priority Dispatching

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::capacity::{split_shares, CapacityGrid};
use crate::graph::{DependencyGraph, TopoOutcome};
use crate::models::{BlockReason, Conflict, ItemId, RoadmapItem, Segment};

/// Output of one auto-scheduling pass: freshly generated segments for
/// every non-pinned item, plus everything that went wrong.
#[derive(Debug, Clone)]
pub struct AutoScheduleResult {
    /// New auto segments.
    pub segments: Vec<Segment>,
    /// Cycles, blocked items, pinned-effort mismatches.
    pub conflicts: Vec<Conflict>,
}

/// Display occupancy of one (team, sprint) cell: segment count for
/// `sequence_order`, used lanes for `row_index`.
#[derive(Debug, Clone, Default)]
struct CellOccupancy {
    count: u32,
    rows: BTreeSet<u32>,
}

impl CellOccupancy {
    fn next_row(&self) -> u32 {
        let mut row = 0;
        while self.rows.contains(&row) {
            row += 1;
        }
        row
    }
}

/// Greedy earliest-feasible-slot scheduler.
#[derive(Debug, Clone)]
pub struct AutoScheduler {
    horizon: u32,
}

impl AutoScheduler {
    /// Creates a scheduler searching up to `horizon` sprints ahead.
    pub fn new(horizon: u32) -> Self {
        Self { horizon }
    }

    /// Places every item without a manual segment.
    ///
    /// `grid` must already be seeded with the manual segments so
    /// pinned work reads as consumed capacity; `existing_segments` is
    /// the persisted set from which the pinned items are derived.
    pub fn schedule(
        &self,
        items: &[RoadmapItem],
        graph: &DependencyGraph,
        topo: &TopoOutcome,
        grid: &mut CapacityGrid,
        existing_segments: &[Segment],
    ) -> AutoScheduleResult {
        let item_by_id: HashMap<ItemId, &RoadmapItem> =
            items.iter().map(|item| (item.id, item)).collect();

        // Pinned placement per item: (latest end sprint, allocated points).
        let mut pinned: HashMap<ItemId, (u32, u32)> = HashMap::new();
        let mut occupancy: BTreeMap<(u32, u32), CellOccupancy> = BTreeMap::new();
        for seg in existing_segments.iter().filter(|s| s.is_manual()) {
            let entry = pinned.entry(seg.item_id).or_insert((0, 0));
            entry.0 = entry.0.max(seg.end_sprint());
            entry.1 += seg.effort;
            for sprint in seg.sprints() {
                let cell = occupancy.entry((seg.team, sprint)).or_default();
                cell.count += 1;
                cell.rows.insert(seg.row_index);
            }
        }

        let mut segments = Vec::new();
        let mut conflicts = Vec::new();
        let mut completion: HashMap<usize, u32> = HashMap::new();

        for cycle in &topo.cycles {
            warn!(members = cycle.len(), "dependency cycle excluded from scheduling");
            conflicts.push(Conflict::CycleDetected {
                cycle: cycle.clone(),
            });
        }

        for &idx in &topo.order {
            let id = graph.id(idx);
            let Some(item) = item_by_id.get(&id) else {
                continue;
            };

            if let Some(&(end, allocated)) = pinned.get(&id) {
                completion.insert(idx, end);
                if allocated != item.effort {
                    conflicts.push(Conflict::EffortMismatch {
                        item_id: id,
                        allocated,
                        estimate: item.effort,
                    });
                }
                continue;
            }

            if let Some(description) = graph.external_blocks(idx).first() {
                warn!(item = id, "blocked on external prerequisite");
                conflicts.push(Conflict::Blocked {
                    item_id: id,
                    reason: BlockReason::ExternalPrerequisite {
                        description: description.clone(),
                    },
                });
                continue;
            }

            let mut earliest = 1u32;
            let mut upstream_block = None;
            for &prereq in graph.prereqs(idx) {
                match completion.get(&prereq) {
                    Some(&end) => earliest = earliest.max(end + 1),
                    None => {
                        upstream_block = Some(graph.id(prereq));
                        break;
                    }
                }
            }
            if let Some(prerequisite) = upstream_block {
                conflicts.push(Conflict::Blocked {
                    item_id: id,
                    reason: BlockReason::PrerequisiteUnscheduled { prerequisite },
                });
                continue;
            }

            match self.place(item, earliest, grid, &mut occupancy) {
                Some((end, mut placed)) => {
                    debug!(item = id, start = earliest, end, "placed item");
                    completion.insert(idx, end);
                    segments.append(&mut placed);
                }
                None => {
                    warn!(item = id, horizon = self.horizon, "no capacity within horizon");
                    conflicts.push(Conflict::Blocked {
                        item_id: id,
                        reason: BlockReason::CapacityExhausted {
                            horizon: self.horizon,
                        },
                    });
                }
            }
        }

        // Items stuck behind a cycle: report unless the user already
        // placed them by hand.
        for &idx in &topo.cycle_blocked {
            let id = graph.id(idx);
            if pinned.contains_key(&id) {
                continue;
            }
            let prerequisite = graph
                .prereqs(idx)
                .iter()
                .map(|&p| graph.id(p))
                .find(|p| match graph.index_of(*p) {
                    Some(p_idx) => !completion.contains_key(&p_idx),
                    None => false,
                })
                .unwrap_or(id);
            conflicts.push(Conflict::Blocked {
                item_id: id,
                reason: BlockReason::PrerequisiteUnscheduled { prerequisite },
            });
        }

        AutoScheduleResult {
            segments,
            conflicts,
        }
    }

    /// Finds the earliest feasible slot for an item and reserves it.
    /// Returns the completion sprint and the emitted segments.
    fn place(
        &self,
        item: &RoadmapItem,
        earliest: u32,
        grid: &mut CapacityGrid,
        occupancy: &mut BTreeMap<(u32, u32), CellOccupancy>,
    ) -> Option<(u32, Vec<Segment>)> {
        if earliest > self.horizon {
            return None;
        }

        let teams = team_preference(item.team_hint, grid.team_count());

        if item.effort == 0 {
            // Unestimated placeholder: pin to the earliest slot on the
            // preferred team without consuming capacity.
            let team = teams.first().copied().unwrap_or(0);
            let segment = emit(item.id, team, earliest, 0, occupancy);
            return Some((earliest, vec![segment]));
        }

        for start in earliest..=self.horizon {
            // Spans are capped at the effort, so every occupied cell
            // needs at least one point.
            let max_span = item.effort.min(self.horizon - start + 1);
            for span in 1..=max_span {
                for &team in &teams {
                    if grid.try_reserve(team, start, span, item.effort) {
                        let shares = split_shares(item.effort, span);
                        let placed: Vec<Segment> = shares
                            .into_iter()
                            .enumerate()
                            .map(|(offset, share)| {
                                emit(item.id, team, start + offset as u32, share, occupancy)
                            })
                            .collect();
                        return Some((start + span - 1, placed));
                    }
                }
            }
        }
        None
    }
}

/// Team search order: the in-range hint first, then ascending index.
fn team_preference(hint: Option<u32>, team_count: u32) -> Vec<u32> {
    let mut teams = Vec::with_capacity(team_count as usize);
    if let Some(preferred) = hint.filter(|&t| t < team_count) {
        teams.push(preferred);
    }
    for team in 0..team_count {
        if teams.first() != Some(&team) {
            teams.push(team);
        }
    }
    teams
}

fn emit(
    item_id: ItemId,
    team: u32,
    sprint: u32,
    effort: u32,
    occupancy: &mut BTreeMap<(u32, u32), CellOccupancy>,
) -> Segment {
    let cell = occupancy.entry((team, sprint)).or_default();
    let segment = Segment::auto(item_id, team, sprint, effort)
        .with_sequence(cell.count)
        .with_row(cell.next_row());
    cell.count += 1;
    cell.rows.insert(segment.row_index);
    segment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, SprintCapacity};

    fn item(id: ItemId, effort: u32, priority: u32) -> RoadmapItem {
        RoadmapItem::new(id).with_effort(effort).with_priority(priority)
    }

    fn run(
        items: &[RoadmapItem],
        deps: &[Dependency],
        existing: &[Segment],
        team_count: u32,
        capacity: SprintCapacity,
        horizon: u32,
    ) -> AutoScheduleResult {
        let graph = DependencyGraph::build(items, deps).unwrap();
        let topo = graph.topo_order();
        let mut grid = CapacityGrid::new(team_count, capacity);
        grid.seed_manual(existing);
        AutoScheduler::new(horizon).schedule(items, &graph, &topo, &mut grid, existing)
    }

    fn segments_for(result: &AutoScheduleResult, id: ItemId) -> Vec<&Segment> {
        result.segments.iter().filter(|s| s.item_id == id).collect()
    }

    #[test]
    fn test_packs_shared_sprint_then_respects_dependency() {
        // A (3 pts, top), B (4 pts, depends on A), C (2 pts, lowest):
        // A and C share sprint 1 (3 + 2 = 5), B waits for A.
        let items = vec![item(1, 3, 1), item(2, 4, 2), item(3, 2, 3)];
        let deps = vec![Dependency::internal(2, 1)];
        let result = run(&items, &deps, &[], 1, SprintCapacity::Uniform(5), 104);

        assert!(result.conflicts.is_empty());
        let a = segments_for(&result, 1);
        let b = segments_for(&result, 2);
        let c = segments_for(&result, 3);
        assert_eq!((a[0].team, a[0].start_sprint, a[0].effort), (0, 1, 3));
        assert_eq!((c[0].team, c[0].start_sprint, c[0].effort), (0, 1, 2));
        assert_eq!((b[0].team, b[0].start_sprint, b[0].effort), (0, 2, 4));
    }

    #[test]
    fn test_external_block() {
        let items = vec![item(4, 2, 1)];
        let deps = vec![Dependency::external(4).with_description("partner contract")];
        let result = run(&items, &deps, &[], 1, SprintCapacity::Uniform(5), 104);

        assert!(result.segments.is_empty());
        assert_eq!(
            result.conflicts,
            vec![Conflict::Blocked {
                item_id: 4,
                reason: BlockReason::ExternalPrerequisite {
                    description: Some("partner contract".into()),
                },
            }]
        );
    }

    #[test]
    fn test_block_propagates_to_dependents() {
        let items = vec![item(4, 2, 1), item(5, 2, 2)];
        let deps = vec![
            Dependency::external(4),
            Dependency::internal(5, 4),
        ];
        let result = run(&items, &deps, &[], 1, SprintCapacity::Uniform(5), 104);

        assert!(result.segments.is_empty());
        assert!(result.conflicts.contains(&Conflict::Blocked {
            item_id: 5,
            reason: BlockReason::PrerequisiteUnscheduled { prerequisite: 4 },
        }));
    }

    #[test]
    fn test_splits_across_sprints() {
        // 8 points never fit a 5-point sprint: 4 + 4 over sprints 1-2.
        let items = vec![item(1, 8, 1)];
        let result = run(&items, &[], &[], 1, SprintCapacity::Uniform(5), 104);

        let segs = segments_for(&result, 1);
        assert_eq!(segs.len(), 2);
        assert_eq!((segs[0].start_sprint, segs[0].effort), (1, 4));
        assert_eq!((segs[1].start_sprint, segs[1].effort), (2, 4));
    }

    #[test]
    fn test_split_remainder_on_final_segment() {
        // 7 points over 5-point sprints: minimal span 2, shares 3 + 4.
        let items = vec![item(1, 7, 1)];
        let result = run(&items, &[], &[], 1, SprintCapacity::Uniform(5), 104);

        let segs = segments_for(&result, 1);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].effort, 3);
        assert_eq!(segs[1].effort, 4);
    }

    #[test]
    fn test_team_hint_preferred() {
        let items = vec![item(1, 3, 1).with_team_hint(1)];
        let result = run(&items, &[], &[], 2, SprintCapacity::Uniform(5), 104);
        assert_eq!(segments_for(&result, 1)[0].team, 1);
    }

    #[test]
    fn test_earlier_start_beats_team_hint() {
        // Hinted team is fully pinned in sprint 1; the other team is
        // free. Start-sprint minimization wins over the hint.
        let items = vec![item(1, 5, 1).with_team_hint(1), item(9, 5, 1)];
        let existing = vec![Segment::manual(9, 1, 1, 5)];
        let result = run(&items, &[], &existing, 2, SprintCapacity::Uniform(5), 104);

        let seg = segments_for(&result, 1);
        assert_eq!((seg[0].team, seg[0].start_sprint), (0, 1));
    }

    #[test]
    fn test_capacity_exhausted_within_horizon() {
        let items = vec![item(1, 6, 1)];
        let result = run(&items, &[], &[], 1, SprintCapacity::Uniform(5), 1);

        assert!(result.segments.is_empty());
        assert_eq!(
            result.conflicts,
            vec![Conflict::Blocked {
                item_id: 1,
                reason: BlockReason::CapacityExhausted { horizon: 1 },
            }]
        );
    }

    #[test]
    fn test_pinned_item_feeds_dependents() {
        let items = vec![item(1, 4, 1), item(2, 2, 2)];
        let deps = vec![Dependency::internal(2, 1)];
        // Item 1 pinned to sprints 2-3; dependent must start at 4.
        let existing = vec![Segment::manual(1, 0, 2, 4).with_span(2)];
        let result = run(&items, &deps, &existing, 1, SprintCapacity::Uniform(5), 104);

        assert!(segments_for(&result, 1).is_empty());
        assert_eq!(segments_for(&result, 2)[0].start_sprint, 4);
    }

    #[test]
    fn test_pinned_effort_mismatch_reported() {
        let items = vec![item(1, 5, 1)];
        let existing = vec![Segment::manual(1, 0, 1, 2)];
        let result = run(&items, &[], &existing, 1, SprintCapacity::Uniform(5), 104);

        assert_eq!(
            result.conflicts,
            vec![Conflict::EffortMismatch {
                item_id: 1,
                allocated: 2,
                estimate: 5,
            }]
        );
    }

    #[test]
    fn test_zero_effort_item_placed_without_reserving() {
        let items = vec![item(1, 0, 1), item(2, 5, 2)];
        let result = run(&items, &[], &[], 1, SprintCapacity::Uniform(5), 104);

        assert_eq!(segments_for(&result, 1)[0].effort, 0);
        // The placeholder left the full budget for item 2.
        assert_eq!(segments_for(&result, 2)[0].start_sprint, 1);
    }

    #[test]
    fn test_sequence_and_rows_in_shared_cell() {
        let items = vec![item(1, 2, 1), item(2, 2, 2)];
        let result = run(&items, &[], &[], 1, SprintCapacity::Uniform(5), 104);

        let first = segments_for(&result, 1)[0];
        let second = segments_for(&result, 2)[0];
        assert_eq!((first.sequence_order, first.row_index), (0, 0));
        assert_eq!((second.sequence_order, second.row_index), (1, 1));
    }

    #[test]
    fn test_rows_avoid_manual_lanes() {
        let items = vec![item(1, 2, 1), item(9, 1, 1)];
        let existing = vec![Segment::manual(9, 0, 1, 1).with_row(0)];
        let result = run(&items, &[], &existing, 1, SprintCapacity::Uniform(5), 104);

        assert_eq!(segments_for(&result, 1)[0].row_index, 1);
    }

    #[test]
    fn test_cycle_members_excluded_others_scheduled() {
        let items = vec![item(1, 2, 1), item(2, 2, 1), item(3, 2, 1), item(5, 2, 2)];
        let deps = vec![
            Dependency::internal(1, 2),
            Dependency::internal(2, 3),
            Dependency::internal(3, 1),
        ];
        let result = run(&items, &deps, &[], 1, SprintCapacity::Uniform(5), 104);

        assert!(result.conflicts.contains(&Conflict::CycleDetected {
            cycle: vec![1, 2, 3],
        }));
        assert!(segments_for(&result, 1).is_empty());
        assert!(segments_for(&result, 2).is_empty());
        assert!(segments_for(&result, 3).is_empty());
        assert_eq!(segments_for(&result, 5)[0].start_sprint, 1);
    }

    #[test]
    fn test_effort_sum_invariant() {
        let items = vec![item(1, 7, 1), item(2, 3, 2), item(3, 11, 3)];
        let result = run(&items, &[], &[], 2, SprintCapacity::Uniform(5), 104);

        for item in &items {
            let total: u32 = segments_for(&result, item.id).iter().map(|s| s.effort).sum();
            assert_eq!(total, item.effort, "item {}", item.id);
        }
    }

    #[test]
    fn test_deterministic_output() {
        let items = vec![item(1, 4, 2), item(2, 4, 2), item(3, 6, 1)];
        let deps = vec![Dependency::internal(2, 3)];
        let first = run(&items, &deps, &[], 2, SprintCapacity::Uniform(5), 104);
        let second = run(&items, &deps, &[], 2, SprintCapacity::Uniform(5), 104);

        assert_eq!(first.segments, second.segments);
        assert_eq!(first.conflicts, second.conflicts);
    }
}
