//! Shared client for the chat-completions service behind OpenRouter.
//! All text intelligence (OCR, simplification, Q&A, translation) goes
//! through [`call_chat_api`].

use anyhow::anyhow;
use reqwest::Client;
use serde_json::{Value, json};

/// Model used for text work: simplification, Q&A, translation.
pub const CHAT_MODEL: &str = "openai/gpt-4.1-mini";

/// Model used for vision OCR over uploaded images.
pub const OCR_MODEL: &str = "openai/gpt-4.1-mini";

/// Single chat-completions call. `content` is the user message content array
/// (text parts, optionally image_url parts for vision OCR).
pub async fn call_chat_api(
    model: &str,
    content: Vec<Value>,
    max_tokens: u32,
) -> anyhow::Result<String> {
    let api_key = std::env::var("OPENROUTER_API_KEY")
        .map_err(|_| anyhow!("OPENROUTER_API_KEY environment variable not set"))?;

    let client = Client::new();

    let payload = json!({
        "model": model,
        "messages": [
            {
                "role": "user",
                "content": content
            }
        ],
        "max_tokens": max_tokens
    });

    let response = client
        .post("https://openrouter.ai/api/v1/chat/completions")
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(anyhow!("LLM API request failed: {}", response.status()));
    }

    let response_json: Value = response.json().await?;

    let content = response_json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow!("Invalid response format from LLM"))?;

    Ok(content.to_string())
}

/// Convenience wrapper for a single text-only prompt.
pub async fn call_chat_api_text(
    model: &str,
    prompt: String,
    max_tokens: u32,
) -> anyhow::Result<String> {
    let content = vec![json!({
        "type": "text",
        "text": prompt
    })];
    call_chat_api(model, content, max_tokens).await
}

/// Models sometimes wrap JSON output in markdown code fences; strip them
/// before parsing.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_prefix
        .strip_suffix("```")
        .unwrap_or(without_prefix)
        .trim()
}
