// 🌐 Remote Data Gateway
// One read per (resource kind, id). No retries, no caching: retry policy,
// if any, belongs to the caller.

pub mod esi;
pub mod memory;

use crate::config::FeedOrder;
use crate::error::GatewayError;
use crate::temporal::Dated;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

pub use esi::EsiGateway;
pub use memory::MemoryGateway;

// ============================================================================
// RESOURCE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    EntityDetails,
    GroupDetails,
    SuperGroupDetails,
    GroupHistory,
    SuperGroupHistory,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::EntityDetails => "entity details",
            ResourceKind::GroupDetails => "group details",
            ResourceKind::SuperGroupDetails => "super-group details",
            ResourceKind::GroupHistory => "group history",
            ResourceKind::SuperGroupHistory => "super-group history",
        }
    }

    /// ESI path for this resource, relative to the base URL
    pub fn path(&self, id: i64) -> String {
        match self {
            ResourceKind::EntityDetails => format!("/characters/{}/", id),
            ResourceKind::GroupDetails => format!("/corporations/{}/", id),
            ResourceKind::SuperGroupDetails => format!("/alliances/{}/", id),
            ResourceKind::GroupHistory => format!("/characters/{}/corporationhistory/", id),
            ResourceKind::SuperGroupHistory => format!("/corporations/{}/alliancehistory/", id),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RAW RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDetails {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetails {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperGroupDetails {
    pub name: String,
}

/// One entry of `/characters/{id}/corporationhistory/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHistoryRecord {
    #[serde(rename = "corporation_id")]
    pub group_id: i64,

    #[serde(rename = "record_id")]
    pub record_seq: i64,

    pub start_date: String,

    /// The group has since been closed; its details usually 404
    #[serde(default)]
    pub is_deleted: bool,
}

impl GroupHistoryRecord {
    pub fn new(group_id: i64, record_seq: i64, start_date: &str) -> Self {
        GroupHistoryRecord {
            group_id,
            record_seq,
            start_date: start_date.to_string(),
            is_deleted: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }
}

impl Dated for GroupHistoryRecord {
    fn start_date(&self) -> &str {
        &self.start_date
    }
}

/// One entry of `/corporations/{id}/alliancehistory/`
///
/// ESI omits `alliance_id` for periods outside any alliance; those decode as 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperGroupHistoryRecord {
    #[serde(rename = "alliance_id", default)]
    pub super_group_id: i64,

    #[serde(rename = "record_id")]
    pub record_seq: i64,

    pub start_date: String,

    /// The super-group has since been closed; its details usually 404
    #[serde(default)]
    pub is_deleted: bool,
}

impl SuperGroupHistoryRecord {
    pub fn new(super_group_id: i64, record_seq: i64, start_date: &str) -> Self {
        SuperGroupHistoryRecord {
            super_group_id,
            record_seq,
            start_date: start_date.to_string(),
            is_deleted: false,
        }
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }
}

impl Dated for SuperGroupHistoryRecord {
    fn start_date(&self) -> &str {
        &self.start_date
    }
}

// ============================================================================
// GATEWAY TRAIT
// ============================================================================

/// Read access to the remote data source
pub trait Gateway: Send + Sync {
    /// Chronological order of the history arrays this source returns
    fn feed_order(&self) -> FeedOrder {
        FeedOrder::OldestFirst
    }

    fn entity_details(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<EntityDetails, GatewayError>> + Send;

    fn group_details(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<GroupDetails, GatewayError>> + Send;

    fn super_group_details(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<SuperGroupDetails, GatewayError>> + Send;

    /// Group periods of an entity
    fn group_history(
        &self,
        entity_id: i64,
    ) -> impl Future<Output = Result<Vec<GroupHistoryRecord>, GatewayError>> + Send;

    /// Super-group periods of a group
    fn super_group_history(
        &self,
        group_id: i64,
    ) -> impl Future<Output = Result<Vec<SuperGroupHistoryRecord>, GatewayError>> + Send;
}

// ============================================================================
// ESI SAMPLES
// ============================================================================

/// ESI response bodies, in the shape and order ESI serves them
#[cfg(test)]
pub(crate) mod samples {
    pub const CHARACTER_ID: i64 = 2119066983;

    /// `/characters/2119066983/corporationhistory/`
    pub const CORPORATION_HISTORY: &str = r#"[
        {"corporation_id": 98169165, "record_id": 32145678, "start_date": "2021-03-14T19:52:00Z"},
        {"corporation_id": 98388312, "record_id": 28456123, "start_date": "2018-07-02T11:08:00Z"},
        {"corporation_id": 98000001, "is_deleted": true, "record_id": 24001987, "start_date": "2016-05-20T02:41:00Z"},
        {"corporation_id": 1000167, "record_id": 23998512, "start_date": "2016-05-12T17:14:00Z"}
    ]"#;

    /// `/corporations/98169165/alliancehistory/`
    pub const ALLIANCE_HISTORY: &str = r#"[
        {"alliance_id": 99003214, "record_id": 1456321, "start_date": "2021-06-01T10:00:00Z"},
        {"record_id": 1398004, "start_date": "2020-11-30T08:00:00Z"},
        {"alliance_id": 99005338, "record_id": 1344712, "start_date": "2019-02-15T21:37:00Z"}
    ]"#;
}

// ============================================================================
// TESTS
// ============================================================================
