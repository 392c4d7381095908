use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::extract::batch::run_batch;
use crate::extract::{ReportExtractor, TextExtractor};
use crate::gateway;
use crate::languages::{SUPPORTED_LANGUAGES, is_supported};
use crate::models::{
    AnalyzeResponse, ChatMessage, ChatRequest, ChatResponse, FileKind, SessionResponse,
    SimplifiedReport, SpeakRequest, SpeakResponse, TranslateRequest, UploadedFile,
};
use crate::session::{SessionError, SessionStore};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

// Uploads carry scanned report pages; allow well beyond the axum default.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

fn gateway_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn session_error(e: SessionError, session_id: &str) -> ApiError {
    match e {
        SessionError::NotFound => not_found_error("Session not found", session_id),
        SessionError::Busy => conflict_error(&e.to_string()),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub extractor: Arc<dyn TextExtractor>,
}

pub fn create_app() -> Router {
    let app_state = AppState {
        sessions: Arc::new(SessionStore::new()),
        extractor: Arc::new(ReportExtractor),
    };
    build_router(app_state)
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/reports/analyze", post(analyze_report))
        .route("/reports/{session_id}", get(get_session))
        .route("/reports/{session_id}/chat", post(chat))
        .route("/reports/{session_id}/translate", post(translate))
        .route("/reports/{session_id}/speak", post(speak))
        .route("/reports/{session_id}/reset", post(reset_session))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Medical Report Simplification Service",
        "version": "1.0.0",
        "description": "Extracts text from uploaded medical reports and simplifies it into plain language, with Q&A, translation and speech playback",
        "endpoints": {
            "POST /reports/analyze": "Upload report files (multipart) and get a simplified report",
            "GET /reports/{session_id}": "Get session state: report and chat transcript",
            "POST /reports/{session_id}/chat": "Ask a question about the analyzed report",
            "POST /reports/{session_id}/translate": "Translate the report, or restore the English original",
            "POST /reports/{session_id}/speak": "Synthesize speech for one report section",
            "POST /reports/{session_id}/reset": "Clear the session state",
            "GET /languages": "Supported translation languages",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_languages() -> Json<Value> {
    let languages: Vec<Value> = SUPPORTED_LANGUAGES
        .iter()
        .map(|l| json!({ "code": l.code, "name": l.name }))
        .collect();
    Json(json!({ "languages": languages }))
}

async fn analyze_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<AnalyzeResponse> {
    let (files, rejected) = collect_upload(multipart).await?;

    let mut warnings = Vec::new();
    if !rejected.is_empty() {
        // One batched warning for all rejected files, not one per file.
        let message = rejected_files_warning(&rejected);
        warn!("{}", message);
        warnings.push(message);
    }

    if files.is_empty() {
        let message = warnings.pop().unwrap_or_else(|| {
            "Please upload at least one image or PDF file to analyze.".to_string()
        });
        return Err(bad_request_error(&message));
    }

    info!("Starting extraction batch over {} files", files.len());
    let outcome = run_batch(state.extractor.as_ref(), &files, |progress| {
        info!("Extraction progress: {:.0}%", progress * 100.0);
    })
    .await;
    warnings.extend(outcome.warnings.iter().map(|w| w.message()));

    if outcome.text.trim().is_empty() {
        return Err(bad_request_error(
            "Could not extract any text from the uploaded files. Please try different files.",
        ));
    }

    let report = gateway::simplify_report(&outcome.text)
        .await
        .into_result()
        .map_err(|e| {
            error!("Simplification failed: {}", e);
            gateway_error("Failed to process the report.", &e)
        })?;

    let session_id = state.sessions.create(outcome.text, report.clone());
    info!("Session {} created for analyzed report", session_id);

    Ok(Json(AnalyzeResponse {
        session_id,
        report,
        warnings,
    }))
}

/// Reads the multipart upload, admitting image and PDF parts and collecting
/// the display names of everything else.
async fn collect_upload(
    mut multipart: Multipart,
) -> Result<(Vec<UploadedFile>, Vec<String>), ApiError> {
    let mut files = Vec::new();
    let mut rejected = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("Invalid multipart upload: {}", e)))?
    {
        let name = field
            .file_name()
            .unwrap_or("unnamed file")
            .to_string();
        let content_type = field.content_type().unwrap_or("").to_string();

        match FileKind::from_content_type(&content_type) {
            Some(kind) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request_error(&format!("Failed to read {}: {}", name, e)))?;
                files.push(UploadedFile {
                    name,
                    kind,
                    bytes: bytes.to_vec(),
                });
            }
            None => rejected.push(name),
        }
    }

    Ok((files, rejected))
}

fn rejected_files_warning(rejected: &[String]) -> String {
    format!(
        "Some files were not added because they are not images or PDFs: {}",
        rejected.join(", ")
    )
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    state
        .sessions
        .with(&session_id, |s| SessionResponse {
            session_id: s.id.clone(),
            report: s.report.clone(),
            chat_messages: s.chat_messages.clone(),
            language: s.language.clone(),
        })
        .map(Json)
        .ok_or_else(|| not_found_error("Session not found", &session_id))
}

async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(bad_request_error("Question cannot be empty"));
    }

    let ticket = state
        .sessions
        .begin_action(&session_id)
        .map_err(|e| session_error(e, &session_id))?;

    // The aggregated source text is the sole binding context for questions;
    // the full text goes out, never a summary.
    let report_text = state
        .sessions
        .with(&session_id, |s| s.report_text.clone())
        .unwrap_or_default();
    if report_text.trim().is_empty() {
        state.sessions.complete(&ticket, |_| ());
        return Err(bad_request_error(
            "No analyzed report in this session. Analyze a report first.",
        ));
    }

    let answer = match gateway::answer_question(&report_text, &question)
        .await
        .into_result()
    {
        Ok(answer) => answer,
        Err(e) => {
            error!("Failed to answer question: {}", e);
            state.sessions.complete(&ticket, |_| ());
            return Err(gateway_error("Failed to get an answer.", &e));
        }
    };

    let committed = state.sessions.complete(&ticket, |s| {
        s.chat_messages.push(ChatMessage::user(question.as_str()));
        s.chat_messages.push(ChatMessage::assistant(answer.as_str()));
    });
    if committed.is_none() {
        return Err(conflict_error(
            "Session was reset while the request was in flight",
        ));
    }

    Ok(Json(ChatResponse { answer }))
}

async fn translate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<TranslateRequest>,
) -> ApiResult<SimplifiedReport> {
    let language = request.language.trim().to_string();
    if !is_supported(&language) {
        return Err(bad_request_error(&format!(
            "Unsupported language code: {}",
            language
        )));
    }

    let ticket = state
        .sessions
        .begin_action(&session_id)
        .map_err(|e| session_error(e, &session_id))?;

    // Translation always starts from the retained English original, so
    // successive target languages never compound.
    let Some(original) = state
        .sessions
        .with(&session_id, |s| s.original_report.clone())
        .flatten()
    else {
        state.sessions.complete(&ticket, |_| ());
        return Err(bad_request_error(
            "No analyzed report in this session. Analyze a report first.",
        ));
    };

    // "English (Original)" restores the retained values without re-fetching.
    if language == "en" {
        state.sessions.complete(&ticket, |s| {
            s.report = Some(original.clone());
            s.language = "en".to_string();
        });
        return Ok(Json(original));
    }

    let translated = match gateway::translate_report(&original, &language)
        .await
        .into_result()
    {
        Ok(report) => report,
        Err(e) => {
            error!("Translation to {} failed: {}", language, e);
            state.sessions.complete(&ticket, |_| ());
            return Err(gateway_error("Failed to translate the report.", &e));
        }
    };

    let committed = state.sessions.complete(&ticket, |s| {
        s.report = Some(translated.clone());
        s.language = language.clone();
    });
    if committed.is_none() {
        return Err(conflict_error(
            "Session was reset while the request was in flight",
        ));
    }

    Ok(Json(translated))
}

async fn speak(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SpeakRequest>,
) -> ApiResult<SpeakResponse> {
    let ticket = state
        .sessions
        .begin_action(&session_id)
        .map_err(|e| session_error(e, &session_id))?;

    let Some(text) = state
        .sessions
        .with(&session_id, |s| {
            s.report
                .as_ref()
                .map(|r| r.section_text(request.section).to_string())
        })
        .flatten()
    else {
        state.sessions.complete(&ticket, |_| ());
        return Err(bad_request_error(
            "No analyzed report in this session. Analyze a report first.",
        ));
    };

    let result = gateway::synthesize_speech(&text).await.into_result();
    // Nothing to commit; completing just releases the single-flight slot.
    let released = state.sessions.complete(&ticket, |_| ());

    let audio_data_uri = result.map_err(|e| {
        error!("Speech synthesis failed: {}", e);
        gateway_error("Failed to convert text to speech.", &e)
    })?;

    if released.is_none() {
        return Err(conflict_error(
            "Session was reset while the request was in flight",
        ));
    }

    Ok(Json(SpeakResponse { audio_data_uri }))
}

async fn reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    state
        .sessions
        .reset(&session_id)
        .map_err(|e| session_error(e, &session_id))?;

    info!("Session {} reset", session_id);
    Ok(Json(json!({
        "session_id": session_id,
        "status": "reset"
    })))
}
