// 👤 Entity - Root of a reconstructed history
// Built fresh by every reconstruction, never updated in place.

use super::GroupMembership;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub display_name: String,

    /// Group periods in feed order, system-operated groups excluded
    pub groups: Vec<GroupMembership>,
}

impl Entity {
    /// The open-ended group period, if the entity is currently in a player group
    pub fn current_group(&self) -> Option<&GroupMembership> {
        self.groups.iter().find(|g| g.is_current())
    }

    /// True if any group or super-group along the history is flagged
    pub fn has_flagged_affiliation(&self) -> bool {
        self.groups
            .iter()
            .any(|g| g.is_flagged || g.super_groups.iter().any(|s| s.is_flagged))
    }
}

// ============================================================================
// TESTS
// ============================================================================
