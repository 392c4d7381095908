//! Translation: one call per report field, three fields issued concurrently.
//!
//! Fail-together semantics: all three calls are awaited, and if any one
//! fails the whole translation fails and no field is committed.

use tracing::info;

use super::GatewayResponse;
use crate::llm::{CHAT_MODEL, call_chat_api_text};
use crate::models::SimplifiedReport;

/// Translates all three report fields into `target_language`, atomically.
pub async fn translate_report(
    report: &SimplifiedReport,
    target_language: &str,
) -> GatewayResponse<SimplifiedReport> {
    let (simplified, summary, key_findings) = tokio::join!(
        translate_text(&report.simplified_report, target_language),
        translate_text(&report.summary, target_language),
        translate_text(&report.key_findings, target_language),
    );

    GatewayResponse::from_result(merge_translations(simplified, summary, key_findings).inspect(
        |_| {
            info!("Report translated to {}", target_language);
        },
    ))
}

async fn translate_text(text: &str, target_language: &str) -> anyhow::Result<String> {
    let prompt = format!(
        "Translate the following text into the language with code \"{}\". Only return the translated text, with no additional explanations or context.

Text to translate:
{}",
        target_language, text
    );
    call_chat_api_text(CHAT_MODEL, prompt, 4000).await
}

/// Commits a translation only when every field succeeded.
fn merge_translations(
    simplified: anyhow::Result<String>,
    summary: anyhow::Result<String>,
    key_findings: anyhow::Result<String>,
) -> anyhow::Result<SimplifiedReport> {
    Ok(SimplifiedReport {
        simplified_report: simplified?,
        summary: summary?,
        key_findings: key_findings?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn all_successes_commit() {
        let report = merge_translations(
            Ok("informe".to_string()),
            Ok("resumen".to_string()),
            Ok("hallazgos".to_string()),
        )
        .unwrap();
        assert_eq!(report.simplified_report, "informe");
        assert_eq!(report.summary, "resumen");
        assert_eq!(report.key_findings, "hallazgos");
    }

    #[test]
    fn one_failure_fails_the_whole_translation() {
        let result = merge_translations(
            Ok("informe".to_string()),
            Err(anyhow!("rate limited")),
            Ok("hallazgos".to_string()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn all_failures_fail() {
        let result = merge_translations(
            Err(anyhow!("a")),
            Err(anyhow!("b")),
            Err(anyhow!("c")),
        );
        assert!(result.is_err());
    }
}
