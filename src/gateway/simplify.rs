//! Simplification: one call producing the structured plain-language report.

use anyhow::anyhow;
use tracing::info;

use super::GatewayResponse;
use crate::llm::{CHAT_MODEL, call_chat_api_text, strip_code_fences};
use crate::models::SimplifiedReport;

/// Simplifies a medical report into plain language. The external service is
/// asked for JSON matching [`SimplifiedReport`]; a malformed or refused
/// response surfaces as an error, not a retry.
pub async fn simplify_report(report_text: &str) -> GatewayResponse<SimplifiedReport> {
    GatewayResponse::from_result(simplify_report_inner(report_text).await)
}

async fn simplify_report_inner(report_text: &str) -> anyhow::Result<SimplifiedReport> {
    let prompt = format!(
        "You are an AI expert in simplifying complex medical jargon in medical reports into plain, easy-to-understand language.

        Your goal is to help users understand their health information by providing a simplified version of their medical report. Also extract key findings and a summary from the report.

        Please simplify the following medical report:

        Report Text: {}

        Follow best practices for no-harm generation and prioritize patient understanding.

        Respond **only** with JSON of the form {{ \"simplifiedReport\": \"...\", \"summary\": \"...\", \"keyFindings\": \"...\" }}.",
        report_text
    );

    let raw = call_chat_api_text(CHAT_MODEL, prompt, 4000).await?;
    let report = parse_simplified_response(&raw)?;

    info!(
        "Report simplified: {} summary chars, {} finding chars",
        report.summary.len(),
        report.key_findings.len()
    );
    Ok(report)
}

fn parse_simplified_response(raw: &str) -> anyhow::Result<SimplifiedReport> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str::<SimplifiedReport>(cleaned)
        .map_err(|e| anyhow!("Could not parse simplification response: {}. Raw response: {}", e, raw))
}
