//! Story graph: nodes, choices, conditions and actions.
//!
//! The types double as the document schema; [`parse_story`] turns a JSON or
//! YAML document into a validated [`Story`].

use std::collections::BTreeMap;

use mechdeck_core::error::DomainError;
use mechdeck_core::reward::RewardIntent;
use mechdeck_core::value::{VarValue, Variables};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Node id that a story starts at when present.
pub const START_NODE_ID: &str = "start";

/// A loaded story. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    /// Story identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short blurb for story listings.
    pub description: String,
    /// Default variable values for a fresh playthrough.
    pub variables: Variables,
    /// Node a fresh playthrough begins at.
    pub start_node_id: String,
    nodes: BTreeMap<String, Node>,
}

impl Story {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Listing entry for this story.
    #[must_use]
    pub fn summary(&self) -> StorySummary {
        StorySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// Story listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySummary {
    /// Story identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short blurb.
    pub description: String,
}

/// One narrative beat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    /// Node identifier; defaults to the node's key in the document.
    #[serde(default)]
    pub id: String,
    /// Optional author tag such as `ending`.
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,
    /// Heading.
    #[serde(default)]
    pub title: String,
    /// Body text with `{{variable}}` placeholders.
    #[serde(default)]
    pub content: String,
    /// Choices in authored order.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Actions run when the node is entered through a choice.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Node {
    /// A node with no choices ends the story.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

/// A player-selectable transition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    /// Button text; may contain placeholders.
    pub text: String,
    /// Node the choice leads to.
    pub target: String,
    /// All must hold for the choice to be shown.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Actions run when the choice is taken.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A visibility test against a story variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    /// Variable name.
    pub variable: String,
    /// Comparison operator.
    pub operator: ConditionOperator,
    /// Right-hand operand; unused by `isset`.
    #[serde(default)]
    pub value: Option<VarValue>,
}

/// Comparison operators a condition may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ConditionOperator {
    /// Loose equality.
    #[serde(rename = "==")]
    Equal,
    /// Loose inequality.
    #[serde(rename = "!=")]
    NotEqual,
    /// Numeric greater-than.
    #[serde(rename = ">")]
    GreaterThan,
    /// Numeric less-than.
    #[serde(rename = "<")]
    LessThan,
    /// Variable is present in the map.
    #[serde(rename = "isset")]
    IsSet,
}

/// Side effects a choice or node entry can trigger.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Action {
    /// Assign a story variable.
    SetVariable {
        /// Variable name.
        name: String,
        /// New value.
        value: VarValue,
    },
    /// Queue a card reward.
    RewardCard {
        /// Specific card, or `None` for a random one.
        #[serde(default)]
        card_id: Option<String>,
        /// Rarity for the random draw.
        #[serde(default)]
        rarity: Option<String>,
    },
    /// Queue a card that is equipped straight into a slot.
    ForceEquipment {
        /// Equipment slot.
        slot: String,
        /// Card to equip.
        card_id: String,
    },
    /// Emit an audio/narration cue for the client.
    NarrativeAudio {
        /// Client-side event name.
        event: String,
        /// Narration text; may contain placeholders.
        #[serde(default)]
        text: String,
    },
    /// Queue any reward intent.
    GrantReward {
        /// The reward.
        reward: RewardIntent,
    },
}

/// Document encodings a story can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
}

impl DocumentFormat {
    /// File extensions tried when looking a story up on disk, in order.
    pub const EXTENSIONS: [(&'static str, Self); 3] =
        [("json", Self::Json), ("yaml", Self::Yaml), ("yml", Self::Yaml)];

    /// Format for a file extension, if supported.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::EXTENSIONS
            .iter()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, format)| *format)
    }
}

#[derive(Debug, Deserialize)]
struct StoryDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    variables: Option<Variables>,
    #[serde(with = "mechdeck_core::ordered")]
    nodes: Vec<(String, Node)>,
}

/// Parses and validates a story document.
///
/// `story_id` is used when the document has no `id` of its own. Choices that
/// point at missing nodes are logged, not rejected; taking one fails later
/// with `InvalidTarget`.
///
/// # Errors
///
/// Returns `DomainError::Parse` if the document is malformed, has no `nodes`
/// map, has an empty `nodes` map, or uses an unknown action type or operator.
pub fn parse_story(
    story_id: &str,
    raw: &str,
    format: DocumentFormat,
) -> Result<Story, DomainError> {
    let document: StoryDocument = match format {
        DocumentFormat::Json => serde_json::from_str(raw)
            .map_err(|e| DomainError::Parse(format!("story {story_id}: {e}")))?,
        DocumentFormat::Yaml => serde_yaml::from_str(raw)
            .map_err(|e| DomainError::Parse(format!("story {story_id}: {e}")))?,
    };

    let Some(first_key) = document.nodes.first().map(|(key, _)| key.clone()) else {
        return Err(DomainError::Parse(format!("story {story_id} has no nodes")));
    };

    let mut nodes = BTreeMap::new();
    for (key, mut node) in document.nodes {
        if node.id.is_empty() {
            node.id.clone_from(&key);
        }
        nodes.insert(key, node);
    }

    let id = document
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| story_id.to_owned());

    for node in nodes.values() {
        for choice in node.choices.iter().filter(|c| !nodes.contains_key(&c.target)) {
            warn!(
                story_id = %id,
                node_id = %node.id,
                target = %choice.target,
                "choice targets a missing node"
            );
        }
    }

    let start_node_id = if nodes.contains_key(START_NODE_ID) {
        START_NODE_ID.to_owned()
    } else {
        first_key
    };

    Ok(Story {
        id,
        title: document.title,
        description: document.description,
        variables: document.variables.unwrap_or_default(),
        start_node_id,
        nodes,
    })
}
