// 🏢 Group membership (corporation period)
// One period of the entity inside a group, with the group's own
// super-group history attached.

use super::SuperGroupMembership;
use crate::temporal::PeriodBound;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: i64,
    pub display_name: String,
    pub period_start: PeriodBound,
    pub period_end: PeriodBound,

    /// Listed in the classification table (independent of any super-group flag)
    pub is_flagged: bool,

    /// Every super-group period of this group, in feed order
    pub super_groups: Vec<SuperGroupMembership>,
}

impl GroupMembership {
    pub fn is_current(&self) -> bool {
        self.period_end.is_now()
    }
}
