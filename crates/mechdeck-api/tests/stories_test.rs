//! Integration tests for the stories routes over the sample content.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn test_list_stories_returns_json_and_yaml_documents() {
    let app = common::build_test_app();

    let (status, json) = common::get_json(app, "/api/v1/stories").await;

    assert_eq!(status, StatusCode::OK);
    let stories = json["stories"].as_array().unwrap();
    let ids: Vec<&str> = stories.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["hangar", "salvage"]);
    assert_eq!(stories[1]["title"], "Salvage Run");
}

#[tokio::test]
async fn test_load_story_starts_new_player_at_start_node() {
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();

    let (status, json) = common::post_json(
        app,
        "/api/v1/stories/hangar/load",
        &serde_json::json!({ "user_id": user_id }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let node = &json["node"];
    assert_eq!(node["node_id"], "start");
    assert_eq!(node["node_type"], "dialogue");
    assert!(
        node["content"]
            .as_str()
            .unwrap()
            .contains("Rookie, your rig is prepped. The board has your reputation at 5.")
    );
    assert_eq!(node["choices"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_launch_path_reports_events_rewards_and_progress() {
    // Arrange
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();
    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/stories/hangar/load",
        &serde_json::json!({ "user_id": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": user_id, "choice_index": 2 }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["node_id"], "launch");
    assert_eq!(json["node"]["is_terminal"], true);
    assert_eq!(
        json["node"]["content"],
        "The rail throws you into the dark. Reputation 2."
    );

    let event_types: Vec<&str> = json["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["metadata"]["event_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        event_types,
        vec![
            "narrative.variable_set",
            "narrative.cue",
            "narrative.node_entered",
            "narrative.reward_queued",
            "narrative.reward_queued",
        ]
    );
    assert_eq!(
        json["events"][1]["kind"]["text"],
        "Unscheduled launch from bay seven, Rookie."
    );

    let rewards = json["rewards"].as_array().unwrap();
    assert_eq!(rewards[0]["reward_type"], "unlock");
    assert_eq!(rewards[1]["reward_type"], "stat_boost");
    assert!(rewards.iter().all(|r| r["success"] == true));
    assert_eq!(json["progress_saved"], true);
    assert_eq!(json["ledger_recorded"], 2);

    let (status, json) = common::get_json(
        app,
        &format!("/api/v1/stories/hangar/progress?user_id={user_id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["node_id"], "launch");
    assert_eq!(json["progress"]["current_node_id"], "launch");
    assert_eq!(json["progress"]["variables"]["reputation"], 2.0);
}

#[tokio::test]
async fn test_armory_path_equips_cannon_and_opens_pack() {
    // Arrange
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();

    // Act
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": user_id, "choice_index": 1, "story_id": "hangar" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["node_id"], "armory");
    let rewards = json["rewards"].as_array().unwrap();
    assert_eq!(rewards[0]["reward_type"], "equipment");
    assert_eq!(rewards[1]["reward_type"], "card_pack");
    assert_eq!(rewards[1]["cards"].as_array().unwrap().len(), 3);

    let (status, json) = common::get_json(app, &format!("/api/v1/players/{user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["player"]["equipment"]["right_arm"]["id"],
        "frost-cannon"
    );
    let collection = json["player"]["collection"].as_array().unwrap();
    assert_eq!(collection.len(), 3);
    assert!(collection.iter().all(|c| c["rarity"] == "common"));
}

#[tokio::test]
async fn test_yaml_story_conditions_follow_variables() {
    // Arrange
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();

    // Act
    let (status, json) = common::post_json(
        app,
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": user_id, "choice_index": 0, "story_id": "salvage" }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["node_id"], "reactor");
    assert_eq!(
        json["node"]["content"],
        "A live core hums in the dark. Scrap: 3."
    );
    let choices = json["node"]["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0]["text"], "Pry the core loose");
}

#[tokio::test]
async fn test_invalid_choice_leaves_player_at_current_node() {
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();

    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": user_id, "choice_index": 9, "story_id": "hangar" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_choice");

    let (status, json) = common::post_json(
        app,
        "/api/v1/stories/hangar/load",
        &serde_json::json!({ "user_id": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["node"]["node_id"], "start");
}

#[tokio::test]
async fn test_reset_restarts_story_with_default_variables() {
    // Arrange
    let app = common::build_test_app();
    let user_id = Uuid::new_v4();
    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": user_id, "choice_index": 2, "story_id": "hangar" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/stories/hangar/reset",
        &serde_json::json!({ "user_id": user_id }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["progress_cleared"], true);
    assert_eq!(json["node"]["node_id"], "start");
    assert_eq!(json["node"]["variables"]["reputation"], 5.0);

    let (_, json) = common::get_json(
        app,
        &format!("/api/v1/stories/hangar/progress?user_id={user_id}"),
    )
    .await;
    assert!(json["progress"].is_null());
}

#[tokio::test]
async fn test_unknown_story_returns_404() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app,
        "/api/v1/stories/derelict/load",
        &serde_json::json!({ "user_id": Uuid::new_v4() }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_malformed_choice_body_gets_json_error() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app,
        "/api/v1/stories/make-choice",
        &serde_json::json!({ "user_id": Uuid::new_v4(), "choice_index": -1, "story_id": "hangar" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().unwrap().contains("choice_index"));
}
