//! Dependency graph over backlog items.
//!
//! Items live in an arena indexed by position; edges are stored as
//! index adjacency lists, so the cyclic shape of the input never turns
//! into ownership cycles. Ordering uses Kahn's algorithm with a
//! priority-ordered ready heap: among items whose prerequisites are
//! all ordered, the lowest (priority rank, item ID) pair comes first,
//! which makes the schedule reproducible.
//!
//! Residual nodes — those whose in-degree never reached zero — either
//! sit on a cycle or depend transitively on one. Walking prerequisite
//! edges inside the residual set from any such node must eventually
//! revisit a node; that loop is the reported cycle, and the walked
//! prefix is blocked by it.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4
//! (Topological Sort)

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{CycleError, GraphError};
use crate::models::{Dependency, ItemId, RoadmapItem};

/// Directed prerequisite graph in arena form.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Item IDs, ascending. Positions in this vector are the arena
    /// indices used everywhere else.
    ids: Vec<ItemId>,
    /// Priority rank per arena index.
    priorities: Vec<u32>,
    index: HashMap<ItemId, usize>,
    /// Arena indices of each item's prerequisites, ascending.
    prereqs: Vec<Vec<usize>>,
    /// Arena indices of the items waiting on each item, ascending.
    dependents: Vec<Vec<usize>>,
    /// Unresolved external-prerequisite descriptions per item.
    externals: Vec<Vec<Option<String>>>,
}

/// Result of ordering the graph.
#[derive(Debug, Clone)]
pub struct TopoOutcome {
    /// Arena indices in dependency order, priority-then-ID tie-broken.
    pub order: Vec<usize>,
    /// Detected cycles as item IDs, each rotated to start at its
    /// smallest member.
    pub cycles: Vec<Vec<ItemId>>,
    /// Residual items that are not on a cycle themselves but depend
    /// transitively on one.
    pub cycle_blocked: Vec<usize>,
}

impl DependencyGraph {
    /// Builds the graph from items and dependency edges.
    ///
    /// Resolved external prerequisites are dropped; unresolved ones
    /// are recorded per item and never participate in cycle
    /// detection.
    pub fn build(items: &[RoadmapItem], dependencies: &[Dependency]) -> Result<Self, GraphError> {
        let mut ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        ids.sort_unstable();

        let mut index = HashMap::with_capacity(ids.len());
        for (pos, &id) in ids.iter().enumerate() {
            if index.insert(id, pos).is_some() {
                return Err(GraphError::DuplicateItem { item_id: id });
            }
        }

        let mut priorities = vec![0u32; ids.len()];
        for item in items {
            priorities[index[&item.id]] = item.priority;
        }

        let mut prereqs = vec![Vec::new(); ids.len()];
        let mut dependents = vec![Vec::new(); ids.len()];
        let mut externals = vec![Vec::new(); ids.len()];

        for dep in dependencies {
            let from = *index
                .get(&dep.from_item())
                .ok_or(GraphError::UnknownItem {
                    item_id: dep.from_item(),
                })?;
            match dep {
                Dependency::Internal { to, .. } => {
                    let to = *index.get(to).ok_or(GraphError::UnknownItem { item_id: *to })?;
                    prereqs[from].push(to);
                    dependents[to].push(from);
                }
                Dependency::External {
                    description,
                    resolved,
                    ..
                } => {
                    if !resolved {
                        externals[from].push(description.clone());
                    }
                }
            }
        }

        for list in prereqs.iter_mut().chain(dependents.iter_mut()) {
            list.sort_unstable();
        }

        Ok(Self {
            ids,
            priorities,
            index,
            prereqs,
            dependents,
            externals,
        })
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph has no items.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Item ID at an arena index.
    pub fn id(&self, idx: usize) -> ItemId {
        self.ids[idx]
    }

    /// Arena index of an item ID.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Arena indices of an item's prerequisites.
    pub fn prereqs(&self, idx: usize) -> &[usize] {
        &self.prereqs[idx]
    }

    /// Unresolved external-prerequisite descriptions for an item.
    pub fn external_blocks(&self, idx: usize) -> &[Option<String>] {
        &self.externals[idx]
    }

    /// Orders the graph, separating cycles and their dependents.
    pub fn topo_order(&self) -> TopoOutcome {
        let n = self.ids.len();
        let mut in_degree: Vec<usize> = self.prereqs.iter().map(|p| p.len()).collect();

        // Ready heap pops the lowest (priority rank, item ID) first.
        let mut ready: BinaryHeap<Reverse<(u32, ItemId, usize)>> = BinaryHeap::new();
        for idx in 0..n {
            if in_degree[idx] == 0 {
                ready.push(Reverse((self.priorities[idx], self.ids[idx], idx)));
            }
        }

        let mut order = Vec::with_capacity(n);
        let mut ordered = vec![false; n];
        while let Some(Reverse((_, _, idx))) = ready.pop() {
            ordered[idx] = true;
            order.push(idx);
            for &dep in &self.dependents[idx] {
                in_degree[dep] -= 1;
                if in_degree[dep] == 0 {
                    ready.push(Reverse((self.priorities[dep], self.ids[dep], dep)));
                }
            }
        }

        let mut cycles = Vec::new();
        let mut in_cycle = vec![false; n];
        let mut visited = vec![false; n];
        for start in 0..n {
            if ordered[start] || visited[start] {
                continue;
            }
            let mut path: Vec<usize> = Vec::new();
            let mut pos: HashMap<usize, usize> = HashMap::new();
            let mut cur = start;
            loop {
                if visited[cur] {
                    // Joins a residual region classified earlier.
                    break;
                }
                if let Some(&at) = pos.get(&cur) {
                    for &member in &path[at..] {
                        in_cycle[member] = true;
                    }
                    cycles.push(self.canonical_cycle(&path[at..]));
                    break;
                }
                pos.insert(cur, path.len());
                path.push(cur);
                match self.prereqs[cur].iter().copied().find(|&p| !ordered[p]) {
                    Some(next) => cur = next,
                    None => break,
                }
            }
            for &node in &path {
                visited[node] = true;
            }
        }

        let cycle_blocked = (0..n)
            .filter(|&idx| !ordered[idx] && !in_cycle[idx])
            .collect();

        TopoOutcome {
            order,
            cycles,
            cycle_blocked,
        }
    }

    /// Cycle as item IDs, rotated to start at the smallest member.
    fn canonical_cycle(&self, members: &[usize]) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = members.iter().map(|&m| self.ids[m]).collect();
        if let Some(min_at) = ids
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| **id)
            .map(|(at, _)| at)
        {
            ids.rotate_left(min_at);
        }
        ids
    }
}

/// Validates a dependency edge set against a backlog.
///
/// Used by the service layer before accepting a mutation (e.g. when a
/// user adds a dependency edge). On success returns the full
/// topological order — every prerequisite precedes its dependents,
/// ties broken by priority rank then item ID.
///
/// # Errors
/// [`GraphError::UnknownItem`] / [`GraphError::DuplicateItem`] for
/// structurally invalid input, [`GraphError::Cycle`] when the edge set
/// is cyclic.
pub fn validate_dependencies(
    items: &[RoadmapItem],
    dependencies: &[Dependency],
) -> Result<Vec<ItemId>, GraphError> {
    let graph = DependencyGraph::build(items, dependencies)?;
    let topo = graph.topo_order();
    if !topo.cycles.is_empty() {
        return Err(GraphError::Cycle(CycleError {
            cycles: topo.cycles,
        }));
    }
    Ok(topo.order.into_iter().map(|idx| graph.id(idx)).collect())
}
