use std::{env, sync::Once};

use gemdrive::drive::DriveClient;
use gemdrive::gemini::GeminiClient;
use gemdrive::{config, retrieval::RagService};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() {
    INIT.call_once(|| {
        set_default_env("DRIVE_FOLDER_ID", "live-validation-folder");
        set_default_env("DRIVE_ACCESS_TOKEN", "unused-for-gemini-tests");
        set_default_env("GEMINI_MODEL", "gemini-flash-latest");
        config::init_config();
    });
}

#[tokio::test]
#[ignore = "Requires a live Gemini API key"]
async fn live_gemini_model_listing() {
    init_config_once();
    let client = GeminiClient::new().expect("failed to build Gemini client");
    let models = client
        .list_generation_models()
        .await
        .expect("failed to list models");
    assert!(
        !models.is_empty(),
        "expected at least one model supporting generation: {models:?}"
    );
    assert!(models.iter().all(|model| !model.short_name().is_empty()));
}

#[tokio::test]
#[ignore = "Requires a live Gemini API key"]
async fn live_gemini_completion_roundtrip() {
    init_config_once();
    let mut client = GeminiClient::new().expect("failed to build Gemini client");
    client.resolve_model().await.expect("no usable model");
    let answer = client
        .generate("Reply with the single word: pong")
        .await
        .expect("generation failed");
    assert!(!answer.trim().is_empty(), "expected a non-empty completion");
}

#[tokio::test]
#[ignore = "Requires live Google Drive credentials and a readable folder"]
async fn live_drive_folder_listing() {
    init_config_once();
    let client = DriveClient::new().expect("failed to build Drive client");
    let files = client
        .list_folder(&config::get_config().drive_folder_id)
        .await
        .expect("failed to list the configured folder");
    assert!(files.iter().all(|file| !file.id.is_empty()));
}

#[tokio::test]
#[ignore = "Requires live Google Drive and Gemini credentials"]
async fn live_pipeline_question() {
    init_config_once();
    let service = RagService::new().await.expect("pipeline init");
    service.reload_documents(None).await.expect("initial load");
    let answer = service
        .answer_query("Summarize the loaded documents in one sentence.")
        .await
        .expect("query failed");
    assert!(!answer.trim().is_empty(), "expected a non-empty answer");
}
