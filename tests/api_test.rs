//! HTTP API integration tests.
//!
//! Tests the endpoints against a [`TestHarness`] server running on a random
//! port with fake engines and a scratch storage root.

mod common;

use std::time::Duration;

use common::{upload_form, TestHarness};

// ---------------------------------------------------------------------------
// Health and docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api-docs/openapi.json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["paths"]["/api/process"].is_object());
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_starts_idle() {
    let (_harness, addr) = TestHarness::with_server().await;
    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["status"], "idle");
    assert_eq!(json["progress"], 0);
    assert_eq!(json["current_step"], "");
    assert!(json["error"].is_null());
}

// ---------------------------------------------------------------------------
// Process, download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn process_returns_slides_and_completes() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.pptx").text("selected_voice", "en-us"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert!(json["job_id"].is_string());
    let slides = json["slides"].as_array().unwrap();
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[0]["slide_number"], 1);
    assert_eq!(slides[0]["narration"], "Narration for slide 1.");

    let status = TestHarness::wait_idle(addr).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["progress"], 100);

    assert!(harness.ctx.store.uploads_dir().join("talk.pptx").is_file());
    assert!(harness.ctx.store.uploads_dir().join("face.png").is_file());

    let resp = client
        .get(format!("http://{addr}/api/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "video/mp4");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert_eq!(resp.text().await.unwrap(), "3 segments");
}

#[tokio::test]
async fn download_before_completion_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/download"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Video not ready yet");
}

#[tokio::test]
async fn unsupported_format_is_rejected() {
    let (harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.key"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "input_error");

    // Nothing was admitted.
    assert_eq!(harness.ctx.jobs.status().status, sc_pipeline::JobState::Idle);
}

#[tokio::test]
async fn missing_face_is_a_bad_request() {
    let (_harness, addr) = TestHarness::with_server().await;
    let form = reqwest::multipart::Form::new().part(
        "pptx_file",
        reqwest::multipart::Part::bytes(b"deck".to_vec()).file_name("talk.pptx"),
    );
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/process"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn undecodable_face_fails_the_job() {
    let (_harness, addr) = TestHarness::with_server().await;
    let form = reqwest::multipart::Form::new()
        .part(
            "pptx_file",
            reqwest::multipart::Part::bytes(b"deck".to_vec()).file_name("talk.pptx"),
        )
        .part(
            "face_file",
            reqwest::multipart::Part::bytes(b"garbage".to_vec()).file_name("face.png"),
        );
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/process"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let status = TestHarness::wait_idle(addr).await;
    assert_eq!(status["status"], "error");
    assert!(status["error"].as_str().unwrap().contains("face image"));
}

#[tokio::test]
async fn second_upload_while_processing_conflicts() {
    let harness = TestHarness::new();
    harness
        .fakes
        .synthesizer
        .script
        .set_delay(Duration::from_millis(300));
    let (_harness, addr) = harness.serve().await;
    let client = reqwest::Client::new();

    let first = client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.pptx"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("other.pptx"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
    let json: serde_json::Value = second.json().await.unwrap();
    assert_eq!(json["code"], "conflict");
}

// ---------------------------------------------------------------------------
// Reset and cleanup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_cancels_and_allows_a_new_job() {
    let harness = TestHarness::new();
    harness
        .fakes
        .synthesizer
        .script
        .set_delay(Duration::from_millis(300));
    let (harness, addr) = harness.serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.pptx"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("http://{addr}/api/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);

    let status: serde_json::Value = client
        .get(format!("http://{addr}/api/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "idle");
    assert_eq!(status["progress"], 0);

    harness
        .fakes
        .synthesizer
        .script
        .set_delay(Duration::ZERO);
    let resp = client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.pptx"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let status = TestHarness::wait_idle(addr).await;
    assert_eq!(status["status"], "completed");
}

#[tokio::test]
async fn cleanup_removes_generated_files() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("http://{addr}/api/process"))
        .multipart(upload_form("talk.pptx"))
        .send()
        .await
        .unwrap();
    let status = TestHarness::wait_idle(addr).await;
    assert_eq!(status["status"], "completed");

    let resp = client
        .post(format!("http://{addr}/api/cleanup"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert!(json["removed"].as_u64().unwrap() > 0);

    assert!(!harness.ctx.store.final_video().exists());
    let resp = client
        .get(format!("http://{addr}/api/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let recent = harness.ctx.event_bus.recent_events(5);
    assert!(recent.iter().any(|e| matches!(
        e.payload,
        sc_core::events::EventPayload::ArtifactsCleaned { .. }
    )));
}

// ---------------------------------------------------------------------------
// Voices and tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn voices_come_from_the_synthesizer() {
    let (_harness, addr) = TestHarness::with_server().await;
    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/voices"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let voices = json["voices"].as_array().unwrap();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0]["id"], "en-us");
}

#[tokio::test]
async fn voice_preview_is_written_and_downloadable() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/preview-voice"))
        .json(&serde_json::json!({ "voice_name": "en-us" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["voice_name"], "en-us");
    assert_eq!(json["download_url"], "/api/download-preview/preview_en-us.wav");
    assert_eq!(harness.fakes.synthesizer.script.calls(), 1);
    assert!(sc_core::is_present(
        &harness.ctx.store.previews_dir().join("preview_en-us.wav")
    ));

    let resp = client
        .get(format!("http://{addr}{}", json["download_url"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "audio/wav");
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("preview_en-us.wav"), "{disposition}");
    assert!(!resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn voice_preview_requires_a_voice_name() {
    let (harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/preview-voice"))
        .json(&serde_json::json!({ "voice_name": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "validation_error");
    assert_eq!(harness.fakes.synthesizer.script.calls(), 0);
}

#[tokio::test]
async fn unknown_preview_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;
    let resp = reqwest::get(format!("http://{addr}/api/download-preview/preview_nope.wav"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Preview file not found");
}

#[tokio::test]
async fn admin_tools_lists_known_tools() {
    let (_harness, addr) = TestHarness::with_server().await;
    let json: serde_json::Value = reqwest::get(format!("http://{addr}/api/admin/tools"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let tools = json.as_array().unwrap();
    assert!(tools.iter().any(|t| t["name"] == "ffmpeg"));
    // The harness registry is empty.
    assert!(tools.iter().all(|t| t["available"] == false));
}
