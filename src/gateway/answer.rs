//! Report Q&A: one call per question, with the full original report text as
//! the only context. Prior chat turns are deliberately not included.

use tracing::info;

use super::GatewayResponse;
use crate::llm::{CHAT_MODEL, call_chat_api_text};

pub async fn answer_question(report_text: &str, question: &str) -> GatewayResponse<String> {
    GatewayResponse::from_result(answer_question_inner(report_text, question).await)
}

async fn answer_question_inner(report_text: &str, question: &str) -> anyhow::Result<String> {
    let prompt = build_answer_prompt(report_text, question);
    let answer = call_chat_api_text(CHAT_MODEL, prompt, 2000).await?;

    info!("Answered report question ({} characters)", answer.len());
    Ok(answer)
}

fn build_answer_prompt(report_text: &str, question: &str) -> String {
    format!(
        "You are a medical AI assistant. Use the following medical report to answer the user's question.

Medical Report:
{}

Question:
{}

Answer:",
        report_text, question
    )
}
