//! Speech and document endpoints used by the chat front-end.
//!
//! Neither endpoint calls the provider: speech synthesis is left to the
//! browser and uploaded forms are only acknowledged so the user can ask
//! questions about them in the chat.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart},
    Json,
};
use sarathi_shared::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ServerError;

const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_rate")]
    pub speed: f32,
    #[serde(default = "default_rate")]
    pub pitch: f32,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_rate() -> f32 {
    1.0
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub success: bool,
    pub method: &'static str,
    pub text: String,
    pub language: String,
    pub speed: f32,
    pub pitch: f32,
    pub message: &'static str,
}

pub async fn text_to_speech(
    request: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Json<SpeechResponse>, ServerError> {
    let Json(request) =
        request.map_err(|rejection| ServerError::MalformedRequest(rejection.body_text()))?;
    if request.text.is_empty() {
        return Err(ServerError::BadRequest("No text provided".to_string()));
    }
    let preview: String = request.text.chars().take(50).collect();
    info!("TTS request: {:?} in {}", preview, request.language);

    Ok(Json(SpeechResponse {
        success: true,
        method: "browser_tts",
        text: request.text,
        language: request.language,
        speed: request.speed,
        pitch: request.pitch,
        message: "Using browser text-to-speech",
    }))
}

pub async fn speech_status() -> Json<Value> {
    Json(json!({
        "status": "active",
        "method": "browser_tts",
        "supported_languages": SUPPORTED_LANGUAGES,
        "message": "Text-to-speech service is running with browser fallback",
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSummary {
    pub file_name: String,
    pub file_size: usize,
    pub message: String,
}

impl PdfSummary {
    pub fn new(file_name: String, file_size: usize) -> Self {
        let message = format!(
            "PDF \"{file_name}\" has been uploaded successfully. I can help you understand how to \
fill out this government form. Please ask me specific questions about any sections you need help with."
        );
        Self {
            file_name,
            file_size,
            message,
        }
    }
}

pub async fn process_pdf(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PdfSummary>, ServerError> {
    let mut multipart =
        multipart.map_err(|rejection| ServerError::MalformedRequest(rejection.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::MalformedRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if field.content_type() != Some(PDF_CONTENT_TYPE) {
            return Err(ServerError::BadRequest("File must be a PDF".to_string()));
        }
        let file_name = field.file_name().unwrap_or("document.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::MalformedRequest(e.body_text()))?;
        info!("Received PDF {} ({} bytes)", file_name, bytes.len());
        return Ok(Json(PdfSummary::new(file_name, bytes.len())));
    }
    Err(ServerError::BadRequest("No file provided".to_string()))
}
