//! # Dependency Graph
//!
//! The creation order between entity kinds, as a lookup table.
//!
//! ```text
//! PlatformAccount
//!      │
//!      ▼
//!   Campaign
//!      │
//!      ▼
//!   AdGroup ──────────┐
//!      │              │
//!      ▼              ▼
//!   Keyword        Creative
//!   (batched on ad group success)
//! ```
//!
//! A child may only be created once its parent is synced (for campaigns: once
//! the account holds a valid credential). Ordering is enforced only along one
//! chain; unrelated trees sync independently.

use crate::types::{EntityKind, ParentKind};

/// One edge of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub child: EntityKind,
    pub parent: ParentKind,
}

/// Every entity kind and the kind it depends on.
pub const DEPENDENCY_TABLE: [Dependency; 4] = [
    Dependency {
        child: EntityKind::Campaign,
        parent: ParentKind::Account,
    },
    Dependency {
        child: EntityKind::AdGroup,
        parent: ParentKind::Campaign,
    },
    Dependency {
        child: EntityKind::Keyword,
        parent: ParentKind::AdGroup,
    },
    Dependency {
        child: EntityKind::Creative,
        parent: ParentKind::AdGroup,
    },
];

/// Kinds whose pending children are created in bulk right after the parent
/// syncs. Creatives are synced individually.
pub const CASCADES: [(EntityKind, EntityKind); 1] = [(EntityKind::AdGroup, EntityKind::Keyword)];

/// The parent kind of `kind`.
pub fn parent_kind(kind: EntityKind) -> ParentKind {
    // DEPENDENCY_TABLE covers every kind (checked in tests)
    DEPENDENCY_TABLE
        .iter()
        .find(|dep| dep.child == kind)
        .map(|dep| dep.parent)
        .unwrap_or(ParentKind::Account)
}

/// Kinds created in bulk once an entity of `kind` syncs.
pub fn cascade_targets(kind: EntityKind) -> Vec<EntityKind> {
    CASCADES
        .iter()
        .filter(|(parent, _)| *parent == kind)
        .map(|(_, child)| *child)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_every_kind_once() {
        for kind in EntityKind::ALL {
            let edges = DEPENDENCY_TABLE.iter().filter(|d| d.child == kind).count();
            assert_eq!(edges, 1, "{kind} must have exactly one parent");
        }
    }

    #[test]
    fn test_parent_kinds() {
        assert_eq!(parent_kind(EntityKind::Campaign), ParentKind::Account);
        assert_eq!(parent_kind(EntityKind::AdGroup), ParentKind::Campaign);
        assert_eq!(parent_kind(EntityKind::Keyword), ParentKind::AdGroup);
        assert_eq!(parent_kind(EntityKind::Creative), ParentKind::AdGroup);
    }

    #[test]
    fn test_only_ad_group_cascades() {
        assert_eq!(cascade_targets(EntityKind::AdGroup), vec![EntityKind::Keyword]);
        assert!(cascade_targets(EntityKind::Campaign).is_empty());
    }
}
