//! Routes for the Rewards context: player state and the reward ledger.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use mechdeck_core::repository::RewardLedgerEntry;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use mechdeck_rewards::application::command_handlers;
use mechdeck_rewards::application::query_handlers::{self, PlayerView};
use mechdeck_rewards::domain::commands;

use super::ApiResponse;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Request body for POST /{user_id}/mech.
#[derive(Debug, Deserialize)]
pub struct SyncMechRequest {
    /// Base mech stats; null clears them.
    #[serde(default)]
    pub stats: Option<BTreeMap<String, i64>>,
}

/// Response body carrying a player's reward state.
#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    /// Read model of the player.
    pub player: PlayerView,
}

/// Response body for GET /{user_id}/rewards.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    /// Granted, unclaimed entries in grant order.
    pub rewards: Vec<RewardLedgerEntry>,
}

/// Response body for POST /{user_id}/rewards/claim.
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    /// Entries that moved to claimed.
    pub claimed: Vec<RewardLedgerEntry>,
}

/// GET /{user_id}
#[instrument(skip(state))]
async fn get_player(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<PlayerResponse>>, ApiError> {
    let player = state.sessions.player(user_id)?;
    Ok(ApiResponse::ok(PlayerResponse {
        player: query_handlers::player_view(&player),
    }))
}

/// POST /{user_id}/mech
#[instrument(skip(state, request))]
async fn sync_mech(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<SyncMechRequest>,
) -> Result<Json<ApiResponse<PlayerResponse>>, ApiError> {
    let command = commands::SyncMechStats {
        correlation_id: Uuid::new_v4(),
        user_id,
        stats: request.stats,
    };

    info!(correlation_id = %command.correlation_id, "handling sync_mech_stats command");

    let mut player = state.sessions.player(user_id)?;
    command_handlers::handle_sync_mech_stats(&command, &mut player)?;
    let view = query_handlers::player_view(&player);
    state.sessions.store_player(player)?;

    Ok(ApiResponse::ok(PlayerResponse { player: view }))
}

/// GET /{user_id}/rewards
#[instrument(skip(state))]
async fn get_pending_rewards(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<PendingResponse>>, ApiError> {
    let rewards = query_handlers::pending_rewards(user_id, state.ledger.as_ref()).await?;
    Ok(ApiResponse::ok(PendingResponse { rewards }))
}

/// POST /{user_id}/rewards/claim
#[instrument(skip(state))]
async fn claim_rewards(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<ClaimResponse>>, ApiError> {
    let command = commands::ClaimRewards {
        correlation_id: Uuid::new_v4(),
        user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling claim_rewards command");

    let claimed = command_handlers::handle_claim_rewards(
        &command,
        state.clock.as_ref(),
        state.ledger.as_ref(),
    )
    .await?;

    Ok(ApiResponse::ok(ClaimResponse { claimed }))
}

/// Returns the router for the players context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(get_player))
        .route("/{user_id}/mech", post(sync_mech))
        .route("/{user_id}/rewards", get(get_pending_rewards))
        .route("/{user_id}/rewards/claim", post(claim_rewards))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use mechdeck_core::clock::Clock;
    use mechdeck_core::repository::{RewardLedger, RewardStatus};
    use mechdeck_core::rng::DeterministicRng;
    use mechdeck_narrative::domain::loader::InMemoryStorySource;
    use mechdeck_test_support::{
        CountingCatalog, FailingRewardLedger, FixedClock, MockRng, RecordingProgressRepository,
        RecordingRewardLedger, fixed_now, sample_cards,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_state_with(ledger: Arc<dyn RewardLedger>) -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
        let rng: Arc<Mutex<dyn DeterministicRng>> = Arc::new(Mutex::new(MockRng));
        AppState::new(
            clock,
            rng,
            Arc::new(InMemoryStorySource::new()),
            Arc::new(CountingCatalog::new(sample_cards())),
            Arc::new(RecordingProgressRepository::new()),
            ledger,
        )
    }

    fn ledger_entry(user_id: Uuid) -> RewardLedgerEntry {
        RewardLedgerEntry {
            entry_id: Uuid::new_v4(),
            user_id,
            story_id: "drill".into(),
            reward_type: "currency".into(),
            payload: serde_json::json!({"intent": {"type": "currency", "currency": "credits", "amount": 5}}),
            status: RewardStatus::Granted,
            dedupe_key: "b".repeat(64),
            granted_at: fixed_now(),
            claimed_at: None,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_player_returns_empty_state_for_new_player() {
        let app = router().with_state(app_state_with(Arc::new(RecordingRewardLedger::new())));
        let user_id = Uuid::new_v4();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/{user_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["player"]["user_id"], user_id.to_string());
        assert!(json["player"]["collection"].as_array().unwrap().is_empty());
        assert!(json["player"]["mech_stats"].is_null());
    }

    #[tokio::test]
    async fn test_sync_mech_stores_stats() {
        // Arrange
        let state = app_state_with(Arc::new(RecordingRewardLedger::new()));
        let user_id = Uuid::new_v4();
        let request = Request::builder()
            .method("POST")
            .uri(format!("/{user_id}/mech"))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_vec(&serde_json::json!({"stats": {"armor": 10, "speed": 4}}))
                    .unwrap(),
            ))
            .unwrap();

        // Act
        let response = router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["player"]["mech_stats"]["armor"], 10);
        let player = state.sessions.player(user_id).unwrap();
        assert_eq!(player.mech_stats().unwrap()["speed"], 4);
    }

    #[tokio::test]
    async fn test_pending_then_claim_moves_entries_to_claimed() {
        // Arrange
        let ledger = Arc::new(RecordingRewardLedger::new());
        let user_id = Uuid::new_v4();
        ledger.append(&ledger_entry(user_id)).await.unwrap();
        let state = app_state_with(ledger.clone());

        // Act
        let pending = router()
            .with_state(state.clone())
            .oneshot(
                Request::builder()
                    .uri(format!("/{user_id}/rewards"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let claim = router()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{user_id}/rewards/claim"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Assert
        assert_eq!(pending.status(), StatusCode::OK);
        assert_eq!(body_json(pending).await["rewards"].as_array().unwrap().len(), 1);
        assert_eq!(claim.status(), StatusCode::OK);
        let json = body_json(claim).await;
        assert_eq!(json["claimed"][0]["status"], "claimed");
        assert!(ledger.pending_for_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_with_failing_ledger_returns_503() {
        let app = router().with_state(app_state_with(Arc::new(FailingRewardLedger)));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/{}/rewards/claim", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "persistence_failure");
    }
}
