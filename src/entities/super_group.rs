// 🛡️ Super-group membership (alliance period)
// Leaf of the tree: one period during which a group sat in a super-group.

use crate::temporal::PeriodBound;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperGroupMembership {
    pub super_group_id: i64,
    pub display_name: String,
    pub period_start: PeriodBound,
    pub period_end: PeriodBound,

    /// Listed in the classification table
    pub is_flagged: bool,
}

impl SuperGroupMembership {
    pub fn new(
        super_group_id: i64,
        display_name: String,
        period_start: PeriodBound,
        period_end: PeriodBound,
        is_flagged: bool,
    ) -> Self {
        SuperGroupMembership {
            super_group_id,
            display_name,
            period_start,
            period_end,
            is_flagged,
        }
    }

    pub fn is_current(&self) -> bool {
        self.period_end.is_now()
    }
}
