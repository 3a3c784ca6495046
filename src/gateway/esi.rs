// ESI gateway - reqwest client against the public EVE Swagger Interface

use super::{
    EntityDetails, Gateway, GroupDetails, GroupHistoryRecord, ResourceKind, SuperGroupDetails,
    SuperGroupHistoryRecord,
};
use crate::config::{FeedOrder, GatewayConfig};
use crate::error::GatewayError;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EsiGateway {
    client: Client,
    base_url: String,
}

impl EsiGateway {
    /// ESI lists history entries most recent first (`record_id` descending)
    pub const FEED_ORDER: FeedOrder = FeedOrder::NewestFirst;

    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GatewayError::fetch(config.base_url.as_str(), e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, kind: ResourceKind, id: i64) -> String {
        format!("{}{}", self.base_url, kind.path(id))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: i64,
    ) -> Result<T, GatewayError> {
        let url = self.url(kind, id);
        tracing::debug!(%url, %kind, "ESI request");

        let resp = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%url, error = %e, "ESI request failed");
                GatewayError::fetch(url.as_str(), e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "ESI returned an error status");
            return Err(GatewayError::fetch(url, format!("HTTP {}", status)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::fetch(url.as_str(), e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(%url, error = %e, bytes = body.len(), "ESI response did not decode");
            GatewayError::decode(url, e.to_string())
        })
    }
}

impl Gateway for EsiGateway {
    fn feed_order(&self) -> FeedOrder {
        Self::FEED_ORDER
    }

    async fn entity_details(&self, id: i64) -> Result<EntityDetails, GatewayError> {
        self.get_json(ResourceKind::EntityDetails, id).await
    }

    async fn group_details(&self, id: i64) -> Result<GroupDetails, GatewayError> {
        self.get_json(ResourceKind::GroupDetails, id).await
    }

    async fn super_group_details(&self, id: i64) -> Result<SuperGroupDetails, GatewayError> {
        self.get_json(ResourceKind::SuperGroupDetails, id).await
    }

    async fn group_history(&self, entity_id: i64) -> Result<Vec<GroupHistoryRecord>, GatewayError> {
        self.get_json(ResourceKind::GroupHistory, entity_id).await
    }

    async fn super_group_history(
        &self,
        group_id: i64,
    ) -> Result<Vec<SuperGroupHistoryRecord>, GatewayError> {
        self.get_json(ResourceKind::SuperGroupHistory, group_id).await
    }
}
