//! Speech synthesis: one call producing a playable audio payload, returned
//! as a data URI so the caller can hand it straight to a player. Playback is
//! fire-and-forget at this boundary; there is no cancellation.

use anyhow::anyhow;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde_json::json;
use tracing::info;

use super::GatewayResponse;

const SPEECH_MODEL: &str = "gpt-4o-mini-tts";
const SPEECH_VOICE: &str = "alloy";

pub async fn synthesize_speech(text: &str) -> GatewayResponse<String> {
    GatewayResponse::from_result(synthesize_speech_inner(text).await)
}

async fn synthesize_speech_inner(text: &str) -> anyhow::Result<String> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;

    let client = Client::new();

    let payload = json!({
        "model": SPEECH_MODEL,
        "voice": SPEECH_VOICE,
        "input": text,
        "response_format": "mp3"
    });

    let response = client
        .post("https://api.openai.com/v1/audio/speech")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Speech synthesis request failed: {}",
            response.status()
        ));
    }

    let audio_bytes = response.bytes().await?;
    info!("Synthesized {} bytes of speech audio", audio_bytes.len());

    Ok(audio_data_uri(&audio_bytes))
}

fn audio_data_uri(audio_bytes: &[u8]) -> String {
    format!("data:audio/mpeg;base64,{}", STANDARD.encode(audio_bytes))
}
