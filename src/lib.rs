// Affiliation History - Core Library
// Exposes all modules for use in the CLI, API server, and tests

pub mod classification;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod gateway;
pub mod lookup;
pub mod temporal;
pub mod timeline;
pub mod warnings;

// Re-export commonly used types
pub use classification::{is_system_operated, ClassificationEntry, ClassificationTable, Cohort};
pub use config::{AppConfig, EngineConfig, FeedOrder, GatewayConfig, SystemOperatedRange};
pub use engine::{HistoryEngine, Reconstruction};
pub use entities::{Entity, GroupMembership, SuperGroupMembership};
pub use error::{GatewayError, InvalidEntityRef, MalformedTimestamp, ReconstructionError};
pub use gateway::{
    EsiGateway, Gateway, GroupHistoryRecord, MemoryGateway, ResourceKind, SuperGroupHistoryRecord,
};
pub use lookup::{parse_entity_ref, portrait_url};
pub use temporal::{
    ends_before_start, overlaps, overlaps_at, resolve_end, resolve_periods, PeriodBound,
};
pub use timeline::{build_timeline, TimelineRow};
pub use warnings::Warnings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
