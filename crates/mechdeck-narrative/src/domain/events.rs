//! Domain events for the Narrative context.
//!
//! A choice reports its effects as events rather than mutating anything
//! outside the session; the reward context consumes the queued intents.

use mechdeck_core::event::{DomainEvent, EventMetadata};
use mechdeck_core::reward::RewardIntent;
use mechdeck_core::value::VarValue;
use serde::{Deserialize, Serialize};

/// Event type emitted when an action assigns a variable.
pub const VARIABLE_SET: &str = "narrative.variable_set";
/// Event type emitted when an action queues a reward.
pub const REWARD_QUEUED: &str = "narrative.reward_queued";
/// Event type emitted for audio/narration cues.
pub const NARRATIVE_CUE: &str = "narrative.cue";
/// Event type emitted when the session moves to a new node.
pub const NODE_ENTERED: &str = "narrative.node_entered";

/// Event payload variants for the Narrative context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeEventKind {
    /// A story variable was assigned.
    VariableSet {
        /// Variable name.
        name: String,
        /// New value.
        value: VarValue,
        /// Value before the assignment, if the variable existed.
        previous: Option<VarValue>,
    },
    /// A reward intent was queued for the reward processor.
    RewardQueued {
        /// The intent.
        reward: RewardIntent,
    },
    /// The client should play a cue.
    NarrativeCue {
        /// Client-side event name.
        event: String,
        /// Narration text with placeholders already substituted.
        text: String,
    },
    /// The session moved along a choice.
    NodeEntered {
        /// Node the choice was taken from.
        from_node_id: String,
        /// Node now current.
        to_node_id: String,
        /// Index of the choice within the visible list.
        choice_index: usize,
    },
}

impl NarrativeEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::VariableSet { .. } => VARIABLE_SET,
            Self::RewardQueued { .. } => REWARD_QUEUED,
            Self::NarrativeCue { .. } => NARRATIVE_CUE,
            Self::NodeEntered { .. } => NODE_ENTERED,
        }
    }
}

/// Domain event envelope for the Narrative context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: NarrativeEventKind,
}

impl DomainEvent for NarrativeEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("NarrativeEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_tagged_by_kind() {
        // Arrange
        let kind = NarrativeEventKind::NodeEntered {
            from_node_id: "start".into(),
            to_node_id: "end".into(),
            choice_index: 0,
        };

        // Act
        let payload = serde_json::to_value(&kind).unwrap();

        // Assert
        assert_eq!(payload["kind"], "node_entered");
        assert_eq!(payload["to_node_id"], "end");
        assert_eq!(kind.event_type(), NODE_ENTERED);
    }

    #[test]
    fn test_reward_payload_nests_the_intent() {
        let kind = NarrativeEventKind::RewardQueued {
            reward: RewardIntent::Currency {
                currency: "credits".into(),
                amount: 25,
            },
        };

        let payload = serde_json::to_value(&kind).unwrap();

        assert_eq!(payload["kind"], "reward_queued");
        assert_eq!(payload["reward"]["type"], "currency");
        assert_eq!(payload["reward"]["amount"], 25);
    }
}
