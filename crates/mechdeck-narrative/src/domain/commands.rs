//! Commands for the Narrative context.

use mechdeck_core::command::Command;
use uuid::Uuid;

/// Command to open a story for a player, resuming saved progress if any.
#[derive(Debug, Clone)]
pub struct LoadStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The story to open.
    pub story_id: String,
}

impl Command for LoadStory {
    fn command_type(&self) -> &'static str {
        "narrative.load_story"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to take a visible choice at the player's current node.
#[derive(Debug, Clone)]
pub struct MakeChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The story being played.
    pub story_id: String,
    /// Index into the visible (filtered) choice list.
    pub choice_index: usize,
}

impl Command for MakeChoice {
    fn command_type(&self) -> &'static str {
        "narrative.make_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Command to discard a player's progress through a story.
#[derive(Debug, Clone)]
pub struct ResetProgress {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The story to restart.
    pub story_id: String,
}

impl Command for ResetProgress {
    fn command_type(&self) -> &'static str {
        "narrative.reset_progress"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn user_id(&self) -> Uuid {
        self.user_id
    }
}
