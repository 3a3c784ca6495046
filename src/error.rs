// 🧯 Error Taxonomy
// Remote failures, timestamp failures and the one fatal reconstruction error.
//
// Only ReconstructionError ever reaches the caller of `reconstruct`.
// Everything else is turned into a warning and the affected branch is dropped.

use thiserror::Error;

// ============================================================================
// GATEWAY ERRORS
// ============================================================================

/// Failure of a single remote read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport failed: connection, timeout or non-2xx status
    #[error("request to {resource} failed: {reason}")]
    Fetch { resource: String, reason: String },

    /// Body arrived but did not match the expected record shape
    #[error("could not decode response from {resource}: {reason}")]
    Decode { resource: String, reason: String },
}

impl GatewayError {
    pub fn fetch(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Fetch {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::Decode {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, GatewayError::Decode { .. })
    }
}

// ============================================================================
// TIMESTAMP ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed timestamp {value:?}: {reason}")]
pub struct MalformedTimestamp {
    pub value: String,
    pub reason: String,
}

// ============================================================================
// RECONSTRUCTION ERRORS
// ============================================================================

/// Fatal failure: the root of the tree could not be established
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    #[error("could not load details for entity {entity_id}")]
    EntityDetails {
        entity_id: i64,
        #[source]
        source: GatewayError,
    },

    #[error("could not load group history for entity {entity_id}")]
    GroupHistory {
        entity_id: i64,
        #[source]
        source: GatewayError,
    },
}

impl ReconstructionError {
    pub fn entity_id(&self) -> i64 {
        match self {
            ReconstructionError::EntityDetails { entity_id, .. }
            | ReconstructionError::GroupHistory { entity_id, .. } => *entity_id,
        }
    }

    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            ReconstructionError::EntityDetails { source, .. }
            | ReconstructionError::GroupHistory { source, .. } => source,
        }
    }
}

// ============================================================================
// LOOKUP ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{input:?} does not contain a valid entity id")]
pub struct InvalidEntityRef {
    pub input: String,
}

// ============================================================================
// TESTS
// ============================================================================
