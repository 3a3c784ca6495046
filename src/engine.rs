// 🧭 History Reconstruction Engine
// Turns two flat remote feeds (entity → groups, group → super-groups) into a
// nested, period-stamped tree.
//
// Failure policy:
//   - entity details / group history unavailable → the whole call fails
//   - anything deeper                              → warning, branch dropped
//
// A reconstruction that got past the root always returns a tree, possibly
// with holes, plus the warnings explaining the holes.

use crate::classification::ClassificationTable;
use crate::config::{EngineConfig, FeedOrder};
use crate::entities::{Entity, GroupMembership, SuperGroupMembership};
use crate::error::ReconstructionError;
use crate::gateway::{Gateway, GroupHistoryRecord, SuperGroupHistoryRecord};
use crate::temporal::{ends_before_start, resolve_periods, PeriodBound};
use crate::timeline::{build_timeline, TimelineRow};
use crate::warnings::Warnings;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// RECONSTRUCTION RESULT
// ============================================================================

/// Output of one `reconstruct` call
#[derive(Debug, Clone, Serialize)]
pub struct Reconstruction {
    /// Correlates log lines of one call
    pub id: Uuid,

    pub entity: Entity,

    /// Super-groups concurrent with each group period
    pub timeline: Vec<TimelineRow>,

    /// Non-fatal failures, in the order they happened
    pub warnings: Warnings,

    pub reconstructed_at: DateTime<Utc>,
}

impl Reconstruction {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {} group periods, {} super-group periods, {} warnings",
            self.entity.display_name,
            self.entity.id,
            self.entity.groups.len(),
            self.entity
                .groups
                .iter()
                .map(|g| g.super_groups.len())
                .sum::<usize>(),
            self.warnings.len()
        )
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct HistoryEngine<G> {
    gateway: G,
    classification: Arc<ClassificationTable>,
    config: EngineConfig,
}

impl<G: Gateway> HistoryEngine<G> {
    pub fn new(gateway: G, classification: Arc<ClassificationTable>, config: EngineConfig) -> Self {
        HistoryEngine {
            gateway,
            classification,
            config,
        }
    }

    /// Engine over the built-in classification table and default settings
    pub fn with_defaults(gateway: G) -> Self {
        Self::new(gateway, ClassificationTable::builtin(), EngineConfig::default())
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Order used to resolve period ends: the configured override, else the
    /// gateway's own
    pub fn feed_order(&self) -> FeedOrder {
        self.config
            .feed_order
            .unwrap_or_else(|| self.gateway.feed_order())
    }

    /// Rebuild the full affiliation history of an entity
    pub async fn reconstruct(&self, entity_id: i64) -> Result<Reconstruction, ReconstructionError> {
        let id = Uuid::new_v4();
        let feed_order = self.feed_order();
        info!(reconstruction = %id, entity_id, ?feed_order, "reconstruction started");

        let (details, history) = futures::join!(
            self.gateway.entity_details(entity_id),
            self.gateway.group_history(entity_id)
        );

        let details = details.map_err(|source| {
            warn!(reconstruction = %id, entity_id, error = %source, "entity details unavailable");
            ReconstructionError::EntityDetails { entity_id, source }
        })?;
        let history = history.map_err(|source| {
            warn!(reconstruction = %id, entity_id, error = %source, "group history unavailable");
            ReconstructionError::GroupHistory { entity_id, source }
        })?;

        let started_at = Utc::now();
        let mut warnings = Warnings::new();
        let mut groups = Vec::new();

        for (record, end) in resolve_periods(&history, feed_order) {
            if let Some(group) = self.build_group(record, end, started_at, &mut warnings).await {
                groups.push(group);
            }
        }

        let entity = Entity {
            id: entity_id,
            display_name: details.name,
            groups,
        };

        let reconstructed_at = Utc::now();
        let timeline = build_timeline(&entity, reconstructed_at, &mut warnings);

        let reconstruction = Reconstruction {
            id,
            entity,
            timeline,
            warnings,
            reconstructed_at,
        };
        info!(reconstruction = %id, "{}", reconstruction.summary());

        Ok(reconstruction)
    }

    async fn build_group(
        &self,
        record: &GroupHistoryRecord,
        end: PeriodBound,
        now: DateTime<Utc>,
        warnings: &mut Warnings,
    ) -> Option<GroupMembership> {
        let group_id = record.group_id;

        if group_id == 0 {
            debug!(record_seq = record.record_seq, "skipping group record without id");
            return None;
        }
        if self.config.system_operated.contains(group_id) {
            debug!(group_id, "skipping system-operated group");
            return None;
        }

        let details = match self.gateway.group_details(group_id).await {
            Ok(details) => details,
            Err(e) => {
                warn!(group_id, closed = record.is_deleted, error = %e, "group details unavailable, period dropped");
                warnings.record(format!(
                    "Group {}{} (period starting {}) was skipped: {}",
                    group_id,
                    closed_note(record.is_deleted),
                    record.start_date,
                    e
                ));
                return None;
            }
        };

        let period_start = PeriodBound::parse(&record.start_date);
        check_period("Group", group_id, &period_start, &end, now, warnings);

        let history = match self.gateway.super_group_history(group_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(group_id, error = %e, "super-group history unavailable, treated as empty");
                warnings.record(format!(
                    "Super-group history of group {} ({}) is unavailable: {}",
                    group_id, details.name, e
                ));
                Vec::new()
            }
        };

        let super_groups = self.build_super_groups(group_id, &history, now, warnings).await;

        Some(GroupMembership {
            group_id,
            display_name: details.name,
            period_start,
            period_end: end,
            is_flagged: self.classification.is_flagged(group_id),
            super_groups,
        })
    }

    /// Name lookups run concurrently; `join_all` keeps feed order for both
    /// nodes and warnings.
    async fn build_super_groups(
        &self,
        group_id: i64,
        history: &[SuperGroupHistoryRecord],
        now: DateTime<Utc>,
        warnings: &mut Warnings,
    ) -> Vec<SuperGroupMembership> {
        let candidates: Vec<(&SuperGroupHistoryRecord, PeriodBound)> =
            resolve_periods(history, self.feed_order())
                .into_iter()
                .filter(|(record, _)| record.super_group_id != 0)
                .collect();

        let lookups = candidates
            .iter()
            .map(|(record, _)| self.gateway.super_group_details(record.super_group_id));
        let results = join_all(lookups).await;

        let mut super_groups = Vec::with_capacity(candidates.len());
        for ((record, end), result) in candidates.into_iter().zip(results) {
            let super_group_id = record.super_group_id;

            match result {
                Ok(details) => {
                    let period_start = PeriodBound::parse(&record.start_date);
                    check_period("Super-group", super_group_id, &period_start, &end, now, warnings);

                    super_groups.push(SuperGroupMembership::new(
                        super_group_id,
                        details.name,
                        period_start,
                        end,
                        self.classification.is_flagged(super_group_id),
                    ));
                }
                Err(e) => {
                    warn!(group_id, super_group_id, closed = record.is_deleted, error = %e, "super-group details unavailable, period dropped");
                    warnings.record(format!(
                        "Super-group {}{} of group {} (period starting {}) was skipped: {}",
                        super_group_id,
                        closed_note(record.is_deleted),
                        group_id,
                        record.start_date,
                        e
                    ));
                }
            }
        }

        super_groups
    }
}

fn closed_note(is_deleted: bool) -> &'static str {
    if is_deleted {
        " [closed]"
    } else {
        ""
    }
}

/// Keeps the period; malformed bounds are left to the timeline to report
fn check_period(
    label: &str,
    id: i64,
    start: &PeriodBound,
    end: &PeriodBound,
    now: DateTime<Utc>,
    warnings: &mut Warnings,
) {
    if let Ok(true) = ends_before_start(start, end, now) {
        warn!(id, %start, %end, "period ends before it starts");
        warnings.record(format!(
            "{} {} period ends ({}) before it starts ({}); the feed order may be wrong",
            label, id, end, start
        ));
    }
}

// ============================================================================
// TESTS
// ============================================================================
