// 📅 Concurrent-affiliation timeline
// For each group period, the super-group periods that overlap it: which
// alliance the entity effectively flew under while in that corporation.
//
// A pair whose timestamps do not parse counts as "no overlap" and leaves a
// warning behind; it never aborts the timeline.

use crate::entities::{Entity, SuperGroupMembership};
use crate::temporal::{overlaps_at, PeriodBound};
use crate::warnings::Warnings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub group_id: i64,
    pub group_name: String,
    pub period_start: PeriodBound,
    pub period_end: PeriodBound,
    pub is_flagged: bool,
    pub concurrent_super_groups: Vec<SuperGroupMembership>,
}

/// One row per group period, in the entity's group order
pub fn build_timeline(entity: &Entity, now: DateTime<Utc>, warnings: &mut Warnings) -> Vec<TimelineRow> {
    entity
        .groups
        .iter()
        .map(|group| {
            let concurrent_super_groups = group
                .super_groups
                .iter()
                .filter(|sg| {
                    match overlaps_at(
                        &group.period_start,
                        &group.period_end,
                        &sg.period_start,
                        &sg.period_end,
                        now,
                    ) {
                        Ok(overlap) => overlap,
                        Err(e) => {
                            tracing::warn!(
                                group_id = group.group_id,
                                super_group_id = sg.super_group_id,
                                error = %e,
                                "overlap check failed, treated as no overlap"
                            );
                            warnings.record(format!(
                                "Could not compare group {} with super-group {}: {}",
                                group.group_id, sg.super_group_id, e
                            ));
                            false
                        }
                    }
                })
                .cloned()
                .collect();

            TimelineRow {
                group_id: group.group_id,
                group_name: group.display_name.clone(),
                period_start: group.period_start.clone(),
                period_end: group.period_end.clone(),
                is_flagged: group.is_flagged,
                concurrent_super_groups,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
