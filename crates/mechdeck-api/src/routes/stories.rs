//! Routes for the Narrative context, plus the reward hand-off after a choice.

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use mechdeck_core::error::DomainError;
use mechdeck_core::repository::ProgressRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use mechdeck_narrative::application::command_handlers::{
    self as narrative_handlers, ChoiceOutcome,
};
use mechdeck_narrative::application::query_handlers::{self, NodeView};
use mechdeck_narrative::domain::commands;
use mechdeck_narrative::domain::events::NarrativeEvent;
use mechdeck_narrative::domain::story::StorySummary;
use mechdeck_rewards::application::command_handlers as reward_handlers;
use mechdeck_rewards::domain::commands::ProcessRewards;
use mechdeck_rewards::domain::processor::ProcessingResult;

use super::ApiResponse;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Request body naming the acting player.
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    /// The player.
    pub user_id: Uuid,
}

/// Request body for POST /make-choice.
#[derive(Debug, Deserialize)]
pub struct MakeChoiceRequest {
    /// The player.
    pub user_id: Uuid,
    /// Index into the visible choices.
    pub choice_index: usize,
    /// Story to act in; defaults to the player's active story.
    #[serde(default)]
    pub story_id: Option<String>,
}

/// Query string for GET /{story_id}/progress.
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    /// The player.
    pub user_id: Uuid,
}

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    /// Every loadable story, sorted by id.
    pub stories: Vec<StorySummary>,
}

/// Response body carrying the node the player is at.
#[derive(Debug, Serialize)]
pub struct NodeResponse {
    /// Rendered node.
    pub node: NodeView,
}

/// Response body for POST /make-choice.
#[derive(Debug, Serialize)]
pub struct ChoiceResponse {
    /// The node the player arrived at.
    pub node: NodeView,
    /// Narrative events of the transition, in order.
    pub events: Vec<NarrativeEvent>,
    /// One result per queued reward.
    pub rewards: Vec<ProcessingResult>,
    /// False when the progress store rejected the write.
    pub progress_saved: bool,
    /// How many granted rewards reached the ledger.
    pub ledger_recorded: usize,
}

/// Response body for GET /{story_id}/progress.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// The node the player is at.
    pub node: NodeView,
    /// Saved progress, or null for a player who never started the story or
    /// whose progress cannot be read.
    pub progress: Option<ProgressRecord>,
}

/// Response body for POST /{story_id}/reset.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// The start node with default variables.
    pub node: NodeView,
    /// False when the progress store rejected the delete.
    pub progress_cleared: bool,
}

/// GET /
#[instrument(skip(state))]
async fn get_stories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StoriesResponse>>, ApiError> {
    let stories = query_handlers::list_stories(state.stories.as_ref())?;
    Ok(ApiResponse::ok(StoriesResponse { stories }))
}

/// POST /{story_id}/load
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn load_story(
    State(state): State<AppState>,
    ApiPath(story_id): ApiPath<String>,
    ApiJson(request): ApiJson<UserRequest>,
) -> Result<Json<ApiResponse<NodeResponse>>, ApiError> {
    let command = commands::LoadStory {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
        story_id,
    };

    info!(correlation_id = %command.correlation_id, story_id = %command.story_id, "handling load_story command");

    let node = narrative_handlers::handle_load_story(
        &command,
        state.stories.as_ref(),
        state.progress.as_ref(),
    )
    .await?;
    state
        .sessions
        .set_active_story(command.user_id, &command.story_id)?;

    Ok(ApiResponse::ok(NodeResponse { node }))
}

/// POST /make-choice
#[instrument(skip(state, request), fields(user_id = %request.user_id, choice_index = request.choice_index))]
async fn make_choice(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<MakeChoiceRequest>,
) -> Result<Json<ApiResponse<ChoiceResponse>>, ApiError> {
    let story_id = match request.story_id {
        Some(story_id) => story_id,
        None => state.sessions.active_story(request.user_id)?.ok_or_else(|| {
            DomainError::Validation(
                "no active story; load a story or pass story_id".to_owned(),
            )
        })?,
    };

    let command = commands::MakeChoice {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
        story_id,
        choice_index: request.choice_index,
    };

    info!(correlation_id = %command.correlation_id, story_id = %command.story_id, "handling make_choice command");

    let ChoiceOutcome {
        node,
        events,
        rewards,
        progress_saved,
    } = narrative_handlers::handle_make_choice(
        &command,
        state.clock.as_ref(),
        state.stories.as_ref(),
        state.progress.as_ref(),
    )
    .await?;
    state
        .sessions
        .set_active_story(command.user_id, &command.story_id)?;

    let rewards_command = ProcessRewards {
        correlation_id: command.correlation_id,
        user_id: command.user_id,
        story_id: command.story_id,
        intents: rewards,
    };
    let mut player = state.sessions.player(rewards_command.user_id)?;
    let outcome = reward_handlers::handle_process_rewards(
        &rewards_command,
        &mut player,
        state.catalog.as_ref(),
        state.clock.as_ref(),
        &state.rng,
        state.ledger.as_ref(),
    )
    .await?;
    state.sessions.store_player(player)?;

    Ok(ApiResponse::ok(ChoiceResponse {
        node,
        events,
        rewards: outcome.results,
        progress_saved,
        ledger_recorded: outcome.ledger_recorded,
    }))
}

/// GET /{story_id}/progress
#[instrument(skip(state, query), fields(user_id = %query.user_id))]
async fn get_progress(
    State(state): State<AppState>,
    ApiPath(story_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<ProgressQuery>,
) -> Result<Json<ApiResponse<ProgressResponse>>, ApiError> {
    let progress =
        query_handlers::get_progress(query.user_id, &story_id, state.progress.as_ref()).await;
    let node = query_handlers::current_node(
        query.user_id,
        &story_id,
        progress.as_ref(),
        state.stories.as_ref(),
    )?;
    Ok(ApiResponse::ok(ProgressResponse { node, progress }))
}

/// POST /{story_id}/reset
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn reset_progress(
    State(state): State<AppState>,
    ApiPath(story_id): ApiPath<String>,
    ApiJson(request): ApiJson<UserRequest>,
) -> Result<Json<ApiResponse<ResetResponse>>, ApiError> {
    let command = commands::ResetProgress {
        correlation_id: Uuid::new_v4(),
        user_id: request.user_id,
        story_id,
    };

    info!(correlation_id = %command.correlation_id, story_id = %command.story_id, "handling reset_progress command");

    let outcome = narrative_handlers::handle_reset_progress(
        &command,
        state.stories.as_ref(),
        state.progress.as_ref(),
    )
    .await?;

    Ok(ApiResponse::ok(ResetResponse {
        node: outcome.node,
        progress_cleared: outcome.progress_cleared,
    }))
}

/// Returns the router for the stories context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_stories))
        .route("/make-choice", post(make_choice))
        .route("/{story_id}/load", post(load_story))
        .route("/{story_id}/progress", get(get_progress))
        .route("/{story_id}/reset", post(reset_progress))
}
