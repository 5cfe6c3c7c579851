//! Roadmap scheduling domain models.
//!
//! Core data types for the scheduling problem and its solution. All
//! types are serde-serializable: snapshots arrive from the service
//! layer as structured data and the resulting segments and conflicts
//! go back the same way.
//!
//! # Domain Mapping
//!
//! | Type | Meaning |
//! |------|---------|
//! | `RoadmapItem` | A unit of backlog work with effort and priority |
//! | `Dependency` | Prerequisite edge (internal item or external gate) |
//! | `Segment` | Placement of (part of) an item on a team/sprint range |
//! | `RoadmapSnapshot` | One session's scheduling input |
//! | `Conflict` | Structured diagnostic returned with the schedule |

mod conflict;
mod dependency;
mod item;
mod segment;
mod snapshot;

pub use conflict::{BlockReason, Conflict};
pub use dependency::Dependency;
pub use item::{ItemId, ItemSource, RoadmapItem};
pub use segment::{Segment, SegmentKind, SegmentStatus};
pub use snapshot::{RoadmapSnapshot, SprintCapacity, DEFAULT_HORIZON};
