//! Scheduling, dashboard and login against a mock service.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local, Utc};
use driftly_client::{ClientConfig, LoginOutcome, StudioClient};
use driftly_studio::{
    AuthManager, Credentials, Dashboard, MemorySink, ScheduleDraft, ScheduleManager, StudioError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/csrf-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "csrf_token": "tok" })))
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> Arc<StudioClient> {
    Arc::new(
        StudioClient::new(ClientConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_retries: 0,
        })
        .unwrap(),
    )
}

fn manager(server: &MockServer) -> ScheduleManager {
    ScheduleManager::new(client(server), Arc::new(MemorySink::new()))
        .with_script_delay(Duration::ZERO)
}

fn credentials() -> Credentials {
    Credentials {
        grok_api_key: "xai-grok-test-key".to_string(),
        fal_api_key: "fal-test-key-1234".to_string(),
        spreadsheet_id: Some("sheet-123".to_string()),
        ..Default::default()
    }
}

/// A draft for tomorrow at 10:00 local time.
fn draft(topic: &str) -> ScheduleDraft {
    let tomorrow = Local::now().date_naive() + ChronoDuration::days(1);
    ScheduleDraft {
        topic: topic.to_string(),
        date: tomorrow.format("%Y-%m-%d").to_string(),
        time: "10:00".to_string(),
        ..Default::default()
    }
}

async fn forbid_script_requests(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/generate-script"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_validation_runs_before_any_request() {
    let server = mock_service().await;
    forbid_script_requests(&server).await;
    let mut schedules = manager(&server);
    let now = Utc::now();

    let mut incomplete = draft("Meteor shower");
    incomplete.time = String::new();
    let err = schedules
        .preview(incomplete, &credentials(), now)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all scheduling fields");

    let no_sheet = Credentials {
        spreadsheet_id: None,
        ..credentials()
    };
    let err = schedules
        .preview(draft("Meteor shower"), &no_sheet, now)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Please configure Google Sheets in the setup to use scheduling"));

    let no_key = Credentials {
        grok_api_key: String::new(),
        ..credentials()
    };
    let err = schedules
        .preview(draft("Meteor shower"), &no_key, now)
        .await
        .unwrap_err();
    assert!(matches!(err, StudioError::MissingCredentials(_)));

    assert!(schedules.pending().is_none());
}

#[tokio::test]
async fn test_past_time_rejected_before_any_request() {
    let server = mock_service().await;
    forbid_script_requests(&server).await;
    let mut schedules = manager(&server);

    let mut past = draft("Solar eclipse");
    past.date = "2000-01-01".to_string();
    let err = schedules
        .preview(past, &credentials(), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please select a future date and time");

    // exactly now is not in the future either
    let exact = draft("Solar eclipse");
    let at = driftly_studio::schedule::parse_local_datetime(&exact.date, &exact.time).unwrap();
    let err = schedules
        .preview(exact, &credentials(), at)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Please select a future date and time");
}

#[tokio::test]
async fn test_preview_and_confirm() {
    let server = mock_service().await;
    Mock::given(method("POST"))
        .and(path("/api/generate-script"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "script_data": {
                "title": "Starfall",
                "final_veo3_prompt": "Meteors streak over mountains"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/schedule-video"))
        .and(body_partial_json(json!({
            "topic": "Meteor shower",
            "duration": 8,
            "style": "cinematic",
            "spreadsheetId": "sheet-123",
            "scriptData": { "visual_prompts": "Edited prompt" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "id": "SCH0007" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut schedules = manager(&server);
    let preview = schedules
        .preview(draft("Meteor shower"), &credentials(), Utc::now())
        .await
        .unwrap();
    assert_eq!(preview.title(), "Starfall");
    assert!(schedules.pending().is_some());

    let confirmation = schedules
        .confirm(Some("Edited prompt".to_string()))
        .await
        .unwrap();
    assert_eq!(confirmation.id.as_deref(), Some("SCH0007"));
    assert_eq!(confirmation.topic, "Meteor shower");
    assert!(confirmation.display_time().contains("at 10:00 AM"));
    assert!(schedules.pending().is_none());
}

#[tokio::test]
async fn test_confirm_without_preview() {
    let server = mock_service().await;
    let mut schedules = manager(&server);
    assert!(matches!(
        schedules.confirm(None).await,
        Err(StudioError::NoPendingRequest)
    ));
}

#[tokio::test]
async fn test_list_flags_entries() {
    let server = mock_service().await;
    let now = Utc::now();
    Mock::given(method("GET"))
        .and(path("/api/scheduled-videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "videos": [
                {
                    "id": "SCH0001",
                    "topic": "Old one",
                    "scheduledTime": (now - ChronoDuration::days(3)).to_rfc3339(),
                    "duration": 8,
                    "style": "moody",
                    "status": "Completed"
                },
                {
                    "id": "SCH0002",
                    "topic": "Next week",
                    "scheduledTime": (now + ChronoDuration::days(7)).to_rfc3339(),
                    "status": "Pending"
                },
                {
                    "id": 3,
                    "topic": "Typed by hand",
                    "scheduledTime": "soon",
                    "duration": "",
                    "status": "Pending"
                },
                { "id": null, "topic": null, "duration": "" }
            ]
        })))
        .mount(&server)
        .await;

    let views = manager(&server).list(&credentials(), now).await.unwrap();
    assert_eq!(views.len(), 3);

    assert!(views[0].is_past);
    assert!(!views[0].can_cancel());
    assert!(!views[1].is_past);
    assert!(!views[1].is_today);
    assert!(views[1].can_cancel());
    assert_eq!(views[1].entry.duration, 8);
    assert_eq!(views[1].entry.style, "cinematic");

    assert_eq!(views[2].entry.id, "3");
    assert_eq!(views[2].entry.duration, 8);
    assert!(views[2].scheduled_at.is_none());
    assert!(!views[2].is_past);
    assert!(views[2].can_cancel());
}

#[tokio::test]
async fn test_list_without_spreadsheet_skips_request() {
    let server = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-videos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let views = manager(&server)
        .list(&Credentials::default(), Utc::now())
        .await
        .unwrap();
    assert!(views.is_empty());
}

#[tokio::test]
async fn test_cancel_and_clear() {
    let server = mock_service().await;
    Mock::given(method("DELETE"))
        .and(path("/api/cancel-scheduled/SCH0002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/clear-cancelled-videos"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "cleared": 1 })),
        )
        .mount(&server)
        .await;

    let schedules = manager(&server);
    schedules.cancel("SCH0002").await.unwrap();
    assert!(matches!(
        schedules.cancel("  ").await,
        Err(StudioError::Validation(_))
    ));

    let (cleared, message) = schedules.clear_cancelled().await.unwrap();
    assert_eq!(cleared, 1);
    assert_eq!(message, "Cleared 1 cancelled video");
}

#[tokio::test]
async fn test_stats_failure_is_not_fatal() {
    let server = mock_service().await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(Dashboard::new(client(&server)).stats().await.is_none());
}

#[tokio::test]
async fn test_recent_videos_are_rendered() {
    let server = mock_service().await;
    let created = (Utc::now() - ChronoDuration::hours(2)).to_rfc3339();
    Mock::given(method("GET"))
        .and(path("/api/recent-videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "videos": [
                { "title": "Reef <live>", "topic": "Coral", "video_url": "", "created_at": created }
            ]
        })))
        .mount(&server)
        .await;

    let videos = Dashboard::new(client(&server))
        .recent_videos(Utc::now())
        .await
        .unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].age, "2 hours ago");
    assert!(videos[0].url.is_none());
    assert!(videos[0].to_html().contains("Reef &lt;live&gt;"));
}

#[tokio::test]
async fn test_login_requires_password() {
    let server = mock_service().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "envVar": "APP_PASSWORD_HASH=abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let auth = AuthManager::new(client(&server));
    let err = auth.login("").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a password");

    let outcome = auth.login("hunter2").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::PasswordCreated {
            env_var: "APP_PASSWORD_HASH=abc123".to_string()
        }
    );
}

#[tokio::test]
async fn test_random_idea_needs_grok_key() {
    let server = mock_service().await;
    Mock::given(method("POST"))
        .and(path("/api/random-idea"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "idea": "Life inside a raindrop" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = Dashboard::new(client(&server));
    assert!(matches!(
        dashboard.random_idea(&Credentials::default()).await,
        Err(StudioError::MissingCredentials(_))
    ));
    assert_eq!(
        dashboard.random_idea(&credentials()).await.unwrap(),
        "Life inside a raindrop"
    );
}
