//! Roadmap scheduling core.
//!
//! Takes a prioritized, dependency-linked backlog and a fixed pool of
//! team capacity per sprint, and produces a sequenced,
//! capacity-respecting placement of each item onto (team, sprint)
//! slots — honoring user-pinned placements, external prerequisites,
//! and the integrity of the dependency graph. Pure computation over an
//! in-memory snapshot: the surrounding service owns persistence,
//! authentication, and everything else.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `RoadmapItem`, `Dependency`,
//!   `Segment`, `RoadmapSnapshot`, `Conflict`
//! - **`graph`**: Dependency graph, topological ordering, cycle
//!   detection
//! - **`capacity`**: Per-(team, sprint) budget accounting
//! - **`scheduler`**: Auto-placement, pinned-segment reconciliation,
//!   summary reports
//! - **`validation`**: Structural integrity checks on snapshots
//!
//! # Entry Points
//!
//! [`validate_dependencies`] checks an edge set before a mutation is
//! accepted; [`recompute_schedule`] runs the full pass and returns the
//! merged segments, conflicts, and report.
//!
//! ```
//! use roadmap_sched::models::{Dependency, RoadmapItem, RoadmapSnapshot, SprintCapacity};
//! use roadmap_sched::recompute_schedule;
//!
//! let snapshot = RoadmapSnapshot::new(1, SprintCapacity::Uniform(5))
//!     .with_item(RoadmapItem::new(1).with_title("Auth").with_effort(3).with_priority(1))
//!     .with_item(RoadmapItem::new(2).with_title("Billing").with_effort(4).with_priority(2))
//!     .with_dependency(Dependency::internal(2, 1));
//!
//! let outcome = recompute_schedule(&snapshot).unwrap();
//! assert_eq!(outcome.segments_for_item(2)[0].start_sprint, 2);
//! ```

pub mod capacity;
pub mod error;
pub mod graph;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{CycleError, GraphError, SnapshotError};
pub use graph::validate_dependencies;
pub use scheduler::{recompute_schedule, ScheduleOutcome, ScheduleReport};
