//! Team capacity accounting.
//!
//! A sparse grid of consumed effort points per (team, sprint) cell,
//! measured against a configured per-sprint budget. The grid is seeded
//! from manually positioned segments before auto-scheduling, so pinned
//! work reads as already-spent capacity, and decremented further as
//! the scheduler reserves slots.
//!
//! Iteration order is `BTreeMap` so every walk over the grid is
//! deterministic.

use std::collections::BTreeMap;

use crate::models::{Segment, SprintCapacity};

/// Splits effort evenly across a span: floor share per sprint, the
/// remainder on the final sprint.
pub(crate) fn split_shares(points: u32, span: u32) -> Vec<u32> {
    let span = span.max(1);
    let base = points / span;
    let mut shares = vec![base; span as usize];
    if let Some(last) = shares.last_mut() {
        *last += points % span;
    }
    shares
}

/// Remaining-capacity grid over (team, sprint) cells.
#[derive(Debug, Clone)]
pub struct CapacityGrid {
    team_count: u32,
    capacity: SprintCapacity,
    used: BTreeMap<(u32, u32), u32>,
}

impl CapacityGrid {
    /// Creates a grid with nothing consumed.
    pub fn new(team_count: u32, capacity: SprintCapacity) -> Self {
        Self {
            team_count,
            capacity,
            used: BTreeMap::new(),
        }
    }

    /// Number of teams.
    pub fn team_count(&self) -> u32 {
        self.team_count
    }

    /// Per-sprint budget for a team.
    pub fn budget(&self, team: u32) -> u32 {
        if team < self.team_count {
            self.capacity.for_team(team)
        } else {
            0
        }
    }

    /// Points consumed in a cell.
    pub fn used(&self, team: u32, sprint: u32) -> u32 {
        self.used.get(&(team, sprint)).copied().unwrap_or(0)
    }

    /// Points still available in a cell. A cell pinned beyond its
    /// budget reads as zero, not negative.
    pub fn remaining(&self, team: u32, sprint: u32) -> u32 {
        self.budget(team).saturating_sub(self.used(team, sprint))
    }

    /// Seeds the grid from manually positioned segments. A segment
    /// spanning several sprints consumes its even-split share per
    /// cell, remainder on the final sprint. Non-manual segments are
    /// ignored: they are regenerated, not carried.
    pub fn seed_manual<'a>(&mut self, segments: impl IntoIterator<Item = &'a Segment>) {
        for seg in segments {
            if !seg.is_manual() {
                continue;
            }
            let shares = split_shares(seg.effort, seg.sprint_count);
            for (offset, share) in shares.into_iter().enumerate() {
                let sprint = seg.start_sprint + offset as u32;
                *self.used.entry((seg.team, sprint)).or_insert(0) += share;
            }
        }
    }

    /// Reserves `points` across `[start_sprint, start_sprint + span)`
    /// on one team, split evenly with the remainder on the final
    /// sprint. All-or-nothing: either every cell has headroom for its
    /// share and the whole range is reserved, or nothing changes.
    pub fn try_reserve(&mut self, team: u32, start_sprint: u32, span: u32, points: u32) -> bool {
        let shares = split_shares(points, span);
        for (offset, &share) in shares.iter().enumerate() {
            if self.remaining(team, start_sprint + offset as u32) < share {
                return false;
            }
        }
        for (offset, share) in shares.into_iter().enumerate() {
            *self
                .used
                .entry((team, start_sprint + offset as u32))
                .or_insert(0) += share;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    #[test]
    fn test_split_shares_even() {
        assert_eq!(split_shares(6, 3), vec![2, 2, 2]);
    }

    #[test]
    fn test_split_shares_remainder_on_final() {
        assert_eq!(split_shares(7, 3), vec![2, 2, 3]);
        assert_eq!(split_shares(5, 2), vec![2, 3]);
    }

    #[test]
    fn test_split_shares_short_effort() {
        // Fewer points than sprints: leading sprints get zero.
        assert_eq!(split_shares(1, 3), vec![0, 0, 1]);
    }

    #[test]
    fn test_uniform_budget() {
        let grid = CapacityGrid::new(2, SprintCapacity::Uniform(5));
        assert_eq!(grid.budget(0), 5);
        assert_eq!(grid.budget(1), 5);
        assert_eq!(grid.budget(2), 0); // out of range
        assert_eq!(grid.remaining(0, 1), 5);
    }

    #[test]
    fn test_per_team_budget() {
        let grid = CapacityGrid::new(2, SprintCapacity::PerTeam(vec![3, 8]));
        assert_eq!(grid.budget(0), 3);
        assert_eq!(grid.budget(1), 8);
    }

    #[test]
    fn test_seed_manual_single_sprint() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        grid.seed_manual([&Segment::manual(1, 0, 2, 3)]);
        assert_eq!(grid.remaining(0, 1), 5);
        assert_eq!(grid.remaining(0, 2), 2);
    }

    #[test]
    fn test_seed_manual_spanning() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        grid.seed_manual([&Segment::manual(1, 0, 1, 5).with_span(2)]);
        // 5 points over 2 sprints: 2 + 3
        assert_eq!(grid.used(0, 1), 2);
        assert_eq!(grid.used(0, 2), 3);
    }

    #[test]
    fn test_seed_ignores_auto_segments() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        grid.seed_manual([&Segment::auto(1, 0, 1, 4)]);
        assert_eq!(grid.remaining(0, 1), 5);
    }

    #[test]
    fn test_overpinned_cell_saturates() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        grid.seed_manual([&Segment::manual(1, 0, 1, 9)]);
        assert_eq!(grid.used(0, 1), 9);
        assert_eq!(grid.remaining(0, 1), 0);
    }

    #[test]
    fn test_try_reserve_single_sprint() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        assert!(grid.try_reserve(0, 1, 1, 3));
        assert_eq!(grid.remaining(0, 1), 2);
        assert!(grid.try_reserve(0, 1, 1, 2));
        assert!(!grid.try_reserve(0, 1, 1, 1));
    }

    #[test]
    fn test_try_reserve_spanning() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        assert!(grid.try_reserve(0, 1, 2, 7)); // 3 + 4
        assert_eq!(grid.remaining(0, 1), 2);
        assert_eq!(grid.remaining(0, 2), 1);
    }

    #[test]
    fn test_try_reserve_is_atomic() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(5));
        grid.seed_manual([&Segment::manual(1, 0, 2, 4)]);
        // 8 over sprints 1-2 needs 4 in each; sprint 2 only has 1 left.
        assert!(!grid.try_reserve(0, 1, 2, 8));
        // Sprint 1 must be untouched by the failed attempt.
        assert_eq!(grid.remaining(0, 1), 5);
    }

    #[test]
    fn test_reserve_zero_points() {
        let mut grid = CapacityGrid::new(1, SprintCapacity::Uniform(0));
        assert!(grid.try_reserve(0, 1, 1, 0));
        assert_eq!(grid.used(0, 1), 0);
    }
}
