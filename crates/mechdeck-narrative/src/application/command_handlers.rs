//! Command handlers for the Narrative context.
//!
//! Each handler loads the story fresh, rebuilds the player's session from the
//! progress store, applies the command and writes progress back. Progress
//! store failures never fail a command: they are logged and the result says
//! whether the write happened. Wrap the store in
//! `mechdeck_store::fallback::FallbackProgressRepository` to keep advancing
//! from in-memory state while it is down.

use mechdeck_core::clock::Clock;
use mechdeck_core::error::DomainError;
use mechdeck_core::repository::{ProgressRecord, ProgressRepository};
use mechdeck_core::reward::RewardIntent;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::query_handlers::{NodeView, render_current_node};
use crate::domain::aggregates::StorySession;
use crate::domain::commands::{LoadStory, MakeChoice, ResetProgress};
use crate::domain::events::NarrativeEvent;
use crate::domain::loader::StorySource;
use crate::domain::story::Story;

/// Result of taking a choice.
#[derive(Debug, Clone, Serialize)]
pub struct ChoiceOutcome {
    /// The node the player arrived at.
    pub node: NodeView,
    /// Every effect of the transition, in order.
    pub events: Vec<NarrativeEvent>,
    /// Reward intents for the reward processor.
    pub rewards: Vec<RewardIntent>,
    /// False when the progress store rejected the write.
    pub progress_saved: bool,
}

/// Result of resetting a story.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    /// The story's start node with default variables.
    pub node: NodeView,
    /// False when the progress store rejected the delete.
    pub progress_cleared: bool,
}

/// Rebuilds a player's session from saved progress, or starts fresh when
/// there is none or the store cannot be read.
pub(crate) async fn resume_session(
    user_id: Uuid,
    story: Story,
    progress: &dyn ProgressRepository,
) -> StorySession {
    match progress.load_progress(user_id, &story.id).await {
        Ok(Some(record)) => StorySession::resume(user_id, story, &record),
        Ok(None) => StorySession::start(user_id, story),
        Err(e) => {
            warn!(%user_id, story_id = %story.id, error = %e, "progress load failed; starting fresh");
            StorySession::start(user_id, story)
        }
    }
}

/// Writes progress, logging and swallowing any failure.
async fn save_progress_best_effort(progress: &dyn ProgressRepository, record: &ProgressRecord) -> bool {
    match progress.save_progress(record).await {
        Ok(()) => true,
        Err(e) => {
            warn!(
                user_id = %record.user_id,
                story_id = %record.story_id,
                error = %e,
                "progress save failed"
            );
            false
        }
    }
}

/// Handles the `LoadStory` command: opens the story at the player's saved
/// node, or at the start node for a new player.
///
/// # Errors
///
/// Returns `DomainError::NotFound` or `DomainError::Parse` from the story
/// source.
pub async fn handle_load_story(
    command: &LoadStory,
    stories: &dyn StorySource,
    progress: &dyn ProgressRepository,
) -> Result<NodeView, DomainError> {
    let story = stories.load(&command.story_id)?;
    let session = resume_session(command.user_id, story, progress).await;
    debug!(
        user_id = %command.user_id,
        story_id = %command.story_id,
        node_id = %session.current_node_id(),
        "story loaded"
    );
    Ok(render_current_node(&session))
}

/// Handles the `MakeChoice` command: applies the transition and saves the
/// new position.
///
/// # Errors
///
/// Returns `DomainError::NotFound` or `DomainError::Parse` from the story
/// source, and `DomainError::InvalidChoice` or `DomainError::InvalidTarget`
/// from the transition. Nothing is saved on error.
pub async fn handle_make_choice(
    command: &MakeChoice,
    clock: &dyn Clock,
    stories: &dyn StorySource,
    progress: &dyn ProgressRepository,
) -> Result<ChoiceOutcome, DomainError> {
    let story = stories.load(&command.story_id)?;
    let mut session = resume_session(command.user_id, story, progress).await;

    session.make_choice(command.choice_index, command.correlation_id, clock)?;

    let events = session.uncommitted_events().to_vec();
    session.clear_uncommitted_events();
    let rewards = session.take_pending_rewards();
    let progress_saved =
        save_progress_best_effort(progress, &session.to_progress_record(clock)).await;

    Ok(ChoiceOutcome {
        node: render_current_node(&session),
        events,
        rewards,
        progress_saved,
    })
}

/// Handles the `ResetProgress` command: deletes saved progress and returns
/// the story's start node.
///
/// # Errors
///
/// Returns `DomainError::NotFound` or `DomainError::Parse` from the story
/// source.
pub async fn handle_reset_progress(
    command: &ResetProgress,
    stories: &dyn StorySource,
    progress: &dyn ProgressRepository,
) -> Result<ResetOutcome, DomainError> {
    let story = stories.load(&command.story_id)?;

    let progress_cleared = match progress
        .reset_progress(command.user_id, &command.story_id)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            warn!(
                user_id = %command.user_id,
                story_id = %command.story_id,
                error = %e,
                "progress reset failed"
            );
            false
        }
    };

    let session = StorySession::start(command.user_id, story);
    Ok(ResetOutcome {
        node: render_current_node(&session),
        progress_cleared,
    })
}
