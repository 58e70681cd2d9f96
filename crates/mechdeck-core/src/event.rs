//! Domain event abstractions.
//!
//! A story transition reports what it did as a list of events. Each event
//! carries the same envelope metadata so that clients and logs can correlate
//! the effects of a single request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name, e.g. `narrative.variable_set`.
    pub event_type: String,
    /// Player whose session produced the event.
    pub user_id: Uuid,
    /// Story the event belongs to.
    pub story_id: String,
    /// 1-based position within the transition that produced it.
    pub sequence_number: i64,
    /// Correlation ID of the command that caused the event.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
