use serde::{Deserialize, Serialize};

/// Media kinds the service accepts for analysis. Anything else is rejected
/// at admission time, before extraction is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// Maps a declared media type to a supported kind.
    /// `image/*` and `application/pdf` are accepted, mirroring the upload
    /// surface contract (`accept="image/*,application/pdf"`).
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        if content_type.starts_with("image/") {
            Some(FileKind::Image)
        } else if content_type == "application/pdf" {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }
}

/// One user-selected file: opaque bytes plus the declared kind and a display
/// name used in warnings. Discarded once extraction completes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

/// The structured simplification produced by the language model.
/// Field names match the wire schema the original report consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedReport {
    pub simplified_report: String,
    pub summary: String,
    pub key_findings: String,
}

impl SimplifiedReport {
    /// Text of one named section of the report.
    pub fn section_text(&self, section: ReportSection) -> &str {
        match section {
            ReportSection::Summary => &self.summary,
            ReportSection::KeyFindings => &self.key_findings,
            ReportSection::SimplifiedReport => &self.simplified_report,
        }
    }
}

/// Addressable sections for per-section speech playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportSection {
    Summary,
    KeyFindings,
    SimplifiedReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of the report Q&A transcript. Append-only, scoped to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpeakRequest {
    pub section: ReportSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakResponse {
    pub audio_data_uri: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub report: SimplifiedReport,
    /// One batched entry for rejected media kinds plus one entry per file
    /// that failed extraction.
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub report: Option<SimplifiedReport>,
    pub chat_messages: Vec<ChatMessage>,
    pub language: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_mapping() {
        assert_eq!(
            FileKind::from_content_type("image/png"),
            Some(FileKind::Image)
        );
        assert_eq!(
            FileKind::from_content_type("image/jpeg"),
            Some(FileKind::Image)
        );
        assert_eq!(
            FileKind::from_content_type("application/pdf"),
            Some(FileKind::Pdf)
        );
        assert_eq!(FileKind::from_content_type("text/plain"), None);
        assert_eq!(FileKind::from_content_type("application/msword"), None);
    }

    #[test]
    fn simplified_report_uses_wire_field_names() {
        let report = SimplifiedReport {
            simplified_report: "full".to_string(),
            summary: "short".to_string(),
            key_findings: "findings".to_string(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["simplifiedReport"], "full");
        assert_eq!(value["keyFindings"], "findings");
        assert_eq!(value["summary"], "short");
    }

    #[test]
    fn section_lookup() {
        let report = SimplifiedReport {
            simplified_report: "full".to_string(),
            summary: "short".to_string(),
            key_findings: "findings".to_string(),
        };
        assert_eq!(report.section_text(ReportSection::Summary), "short");
        assert_eq!(report.section_text(ReportSection::KeyFindings), "findings");
        assert_eq!(
            report.section_text(ReportSection::SimplifiedReport),
            "full"
        );
    }
}
