//! Query handlers for the Narrative context.

use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{ProgressRecord, ProgressRepository};
use mechdeck_core::value::Variables;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::domain::aggregates::StorySession;
use crate::domain::loader::StorySource;
use crate::domain::story::StorySummary;
use crate::domain::template::substitute;

/// A choice as shown to the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceView {
    /// Index to send back with `make_choice`.
    pub index: usize,
    /// Text with placeholders substituted.
    pub text: String,
}

/// The player's current node, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// Story identifier.
    pub story_id: String,
    /// Node identifier.
    pub node_id: String,
    /// Heading.
    pub title: String,
    /// Author tag such as `ending`.
    pub node_type: Option<String>,
    /// Body with placeholders substituted.
    pub content: String,
    /// Visible choices only.
    pub choices: Vec<ChoiceView>,
    /// True when there is nothing left to choose.
    pub is_terminal: bool,
    /// Variable snapshot.
    pub variables: Variables,
}

/// Renders the session's current node: substitutes placeholders and drops
/// choices whose conditions fail.
///
/// A session positioned on a node the story no longer has renders as a
/// terminal placeholder.
#[must_use]
pub fn render_current_node(session: &StorySession) -> NodeView {
    let story_id = session.story().id.clone();
    let variables = session.variables().clone();

    let Some(node) = session.current_node() else {
        return NodeView {
            story_id,
            node_id: session.current_node_id().to_owned(),
            title: "Missing node".to_owned(),
            node_type: None,
            content: "This part of the story is unavailable.".to_owned(),
            choices: Vec::new(),
            is_terminal: true,
            variables,
        };
    };

    let choices = session
        .visible_choices()
        .into_iter()
        .enumerate()
        .map(|(index, choice)| ChoiceView {
            index,
            text: substitute(&choice.text, &variables),
        })
        .collect();

    NodeView {
        story_id,
        node_id: node.id.clone(),
        title: substitute(&node.title, &variables),
        node_type: node.node_type.clone(),
        content: substitute(&node.content, &variables),
        choices,
        is_terminal: node.is_terminal(),
        variables,
    }
}

/// Lists the stories a player can open.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the source cannot be enumerated.
pub fn list_stories(stories: &dyn StorySource) -> Result<Vec<StorySummary>, DomainError> {
    stories.list()
}

/// Returns the saved progress for a player in a story, if any.
///
/// A store failure is logged and reads as no progress, so the caller falls
/// back to the start node.
pub async fn get_progress(
    user_id: Uuid,
    story_id: &str,
    progress: &dyn ProgressRepository,
) -> Option<ProgressRecord> {
    match progress.load_progress(user_id, story_id).await {
        Ok(record) => record,
        Err(e) => {
            warn!(%user_id, %story_id, error = %e, "progress load failed; reporting no progress");
            None
        }
    }
}

/// Renders the node `record` left the player at, or the start node when
/// there is no record.
///
/// # Errors
///
/// Returns `DomainError::NotFound` or `DomainError::Parse` from the story
/// source.
pub fn current_node(
    user_id: Uuid,
    story_id: &str,
    record: Option<&ProgressRecord>,
    stories: &dyn StorySource,
) -> Result<NodeView, DomainError> {
    let story = stories.load(story_id)?;
    let session = match record {
        Some(record) => StorySession::resume(user_id, story, record),
        None => StorySession::start(user_id, story),
    };
    Ok(render_current_node(&session))
}
