//! Dependency edges between backlog items.
//!
//! Two kinds of prerequisite exist: another item in the backlog
//! (internal, participates in ordering and cycle detection) and an
//! out-of-system prerequisite (external, blocks its item until the
//! user marks it resolved). The two are separate variants so that
//! "no schedulable counterpart" never has to be encoded as a missing
//! target ID.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// A directed prerequisite edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dependency {
    /// `from` cannot start until `to` completes.
    Internal { from: ItemId, to: ItemId },

    /// `from` is gated on something outside this system (a vendor
    /// deliverable, a legal sign-off). Blocks `from` and all its
    /// transitive dependents until `resolved` is set.
    External {
        from: ItemId,
        /// What the item is waiting on, for diagnostics.
        description: Option<String>,
        /// Cleared by the user once the prerequisite is met.
        resolved: bool,
    },
}

impl Dependency {
    /// Creates an internal edge: `from` waits for `to`.
    pub fn internal(from: ItemId, to: ItemId) -> Self {
        Self::Internal { from, to }
    }

    /// Creates an unresolved external prerequisite.
    pub fn external(from: ItemId) -> Self {
        Self::External {
            from,
            description: None,
            resolved: false,
        }
    }

    /// Sets the external prerequisite description. No-op on internal edges.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        if let Self::External { description, .. } = &mut self {
            *description = Some(text.into());
        }
        self
    }

    /// Marks an external prerequisite as resolved. No-op on internal edges.
    pub fn with_resolved(mut self, value: bool) -> Self {
        if let Self::External { resolved, .. } = &mut self {
            *resolved = value;
        }
        self
    }

    /// The item this edge gates.
    pub fn from_item(&self) -> ItemId {
        match self {
            Self::Internal { from, .. } | Self::External { from, .. } => *from,
        }
    }

    /// The prerequisite item, if this is an internal edge.
    pub fn internal_target(&self) -> Option<ItemId> {
        match self {
            Self::Internal { to, .. } => Some(*to),
            Self::External { .. } => None,
        }
    }

    /// Whether this edge currently blocks its item from scheduling
    /// on its own (internal edges gate through ordering instead).
    pub fn is_unresolved_external(&self) -> bool {
        matches!(self, Self::External { resolved: false, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_edge() {
        let dep = Dependency::internal(2, 1);
        assert_eq!(dep.from_item(), 2);
        assert_eq!(dep.internal_target(), Some(1));
        assert!(!dep.is_unresolved_external());
    }

    #[test]
    fn test_external_edge() {
        let dep = Dependency::external(4).with_description("vendor API keys");
        assert_eq!(dep.from_item(), 4);
        assert_eq!(dep.internal_target(), None);
        assert!(dep.is_unresolved_external());
    }

    #[test]
    fn test_external_resolution() {
        let dep = Dependency::external(4).with_resolved(true);
        assert!(!dep.is_unresolved_external());
    }

    #[test]
    fn test_description_noop_on_internal() {
        let dep = Dependency::internal(2, 1).with_description("ignored");
        assert_eq!(dep, Dependency::internal(2, 1));
    }
}
