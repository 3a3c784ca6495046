// In-process gateway - canned records and injected failures
//
// Unregistered history lists read as empty; unregistered details fail with a
// not-found fetch error, like ESI's 404.

use super::{
    EntityDetails, Gateway, GroupDetails, GroupHistoryRecord, ResourceKind, SuperGroupDetails,
    SuperGroupHistoryRecord,
};
use crate::config::FeedOrder;
use crate::error::GatewayError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    names: HashMap<(ResourceKind, i64), String>,
    group_histories: HashMap<i64, Vec<GroupHistoryRecord>>,
    super_group_histories: HashMap<i64, Vec<SuperGroupHistoryRecord>>,
    failures: HashMap<(ResourceKind, i64), GatewayError>,
    feed_order: FeedOrder,

    /// Every read, in call order
    calls: Arc<Mutex<Vec<(ResourceKind, i64)>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, id: i64, name: &str) -> Self {
        self.names.insert((ResourceKind::EntityDetails, id), name.to_string());
        self
    }

    pub fn with_group(mut self, id: i64, name: &str) -> Self {
        self.names.insert((ResourceKind::GroupDetails, id), name.to_string());
        self
    }

    pub fn with_super_group(mut self, id: i64, name: &str) -> Self {
        self.names.insert((ResourceKind::SuperGroupDetails, id), name.to_string());
        self
    }

    pub fn with_group_history(mut self, entity_id: i64, records: Vec<GroupHistoryRecord>) -> Self {
        self.group_histories.insert(entity_id, records);
        self
    }

    pub fn with_super_group_history(
        mut self,
        group_id: i64,
        records: Vec<SuperGroupHistoryRecord>,
    ) -> Self {
        self.super_group_histories.insert(group_id, records);
        self
    }

    /// Serve histories in another order (e.g. recorded ESI bodies)
    pub fn with_feed_order(mut self, order: FeedOrder) -> Self {
        self.feed_order = order;
        self
    }

    /// Make one read fail with the given error
    pub fn with_failure(mut self, kind: ResourceKind, id: i64, error: GatewayError) -> Self {
        self.failures.insert((kind, id), error);
        self
    }

    /// Make one read fail with a transport error
    pub fn failing(self, kind: ResourceKind, id: i64) -> Self {
        let error = GatewayError::fetch(Self::resource(kind, id), "connection reset");
        self.with_failure(kind, id, error)
    }

    pub fn calls(&self) -> Vec<(ResourceKind, i64)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn resource(kind: ResourceKind, id: i64) -> String {
        format!("memory:{}", kind.path(id))
    }

    fn begin(&self, kind: ResourceKind, id: i64) -> Result<(), GatewayError> {
        match self.calls.lock() {
            Ok(mut calls) => calls.push((kind, id)),
            Err(poisoned) => poisoned.into_inner().push((kind, id)),
        }

        match self.failures.get(&(kind, id)) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn name(&self, kind: ResourceKind, id: i64) -> Result<String, GatewayError> {
        self.begin(kind, id)?;
        self.names
            .get(&(kind, id))
            .cloned()
            .ok_or_else(|| GatewayError::fetch(Self::resource(kind, id), "HTTP 404 Not Found"))
    }
}

impl Gateway for MemoryGateway {
    fn feed_order(&self) -> FeedOrder {
        self.feed_order
    }

    async fn entity_details(&self, id: i64) -> Result<EntityDetails, GatewayError> {
        let name = self.name(ResourceKind::EntityDetails, id)?;
        Ok(EntityDetails { name })
    }

    async fn group_details(&self, id: i64) -> Result<GroupDetails, GatewayError> {
        let name = self.name(ResourceKind::GroupDetails, id)?;
        Ok(GroupDetails { name })
    }

    async fn super_group_details(&self, id: i64) -> Result<SuperGroupDetails, GatewayError> {
        let name = self.name(ResourceKind::SuperGroupDetails, id)?;
        Ok(SuperGroupDetails { name })
    }

    async fn group_history(&self, entity_id: i64) -> Result<Vec<GroupHistoryRecord>, GatewayError> {
        self.begin(ResourceKind::GroupHistory, entity_id)?;
        Ok(self.group_histories.get(&entity_id).cloned().unwrap_or_default())
    }

    async fn super_group_history(
        &self,
        group_id: i64,
    ) -> Result<Vec<SuperGroupHistoryRecord>, GatewayError> {
        self.begin(ResourceKind::SuperGroupHistory, group_id)?;
        Ok(self.super_group_histories.get(&group_id).cloned().unwrap_or_default())
    }
}
