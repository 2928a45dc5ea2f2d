use axum::{body::Bytes, extract::State, Json};
use sarathi_shared::{
    language_tag, ChatChoice, ChatCompletionResponse, ChatMessage, ChatRequest, MessageRole,
    SUPPORTED_LANGUAGES,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::ServerError;
use crate::provider::ProviderRequest;
use crate::AppState;

pub const MODELS: [&str; 3] = ["indic-llm", "indic-chat", "government-assistant"];

pub fn system_prompt(language: &str) -> String {
    format!(
        "You are Sarathi AI, a helpful government assistant designed to help people understand \
and fill out government forms in {language}. You specialize in:

1. Analyzing government forms and documents
2. Providing step-by-step guidance on how to fill out forms
3. Explaining required documents and eligibility criteria
4. Answering questions about government procedures
5. Supporting multiple Indian languages

Guidelines:
- Be patient and explain things in simple terms
- Provide practical, actionable advice
- If you're unsure about specific legal requirements, advise consulting official sources
- Be culturally sensitive and respectful
- Use clear, numbered steps when explaining processes
- Mention required documents and where to obtain them
- Respond in {language} language when appropriate"
    )
}

/// Derive the provider payload for a chat request.
pub fn provider_request(request: &ChatRequest) -> ProviderRequest {
    let tag = language_tag(&request.language);
    ProviderRequest {
        prompt: request.last_user_message().to_string(),
        src_lang: tag,
        tgt_lang: tag,
        system_prompt: system_prompt(&request.language),
    }
}

/// Wrap provider reply text in a chat-completion object.
pub fn completion(model: String, reply: String) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4().simple()),
        object: "chat.completion".to_string(),
        created: chrono::Utc::now().timestamp(),
        model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: MessageRole::Assistant,
                content: reply,
            },
            finish_reason: "stop".to_string(),
        }],
    }
}

/// One relay cycle: derive the prompt, call the provider once, reshape the reply.
pub async fn handle(
    state: &AppState,
    request: ChatRequest,
) -> Result<ChatCompletionResponse, ServerError> {
    let api_key = state
        .config
        .api_key
        .as_deref()
        .ok_or(ServerError::NotConfigured("DWANI_API_KEY"))?;

    info!(
        language = %request.language,
        model = %request.model,
        messages = request.messages.len(),
        "Relaying chat request"
    );

    let outbound = provider_request(&request);
    let reply = state.provider.chat(api_key, &outbound).await?;
    Ok(completion(request.model, reply))
}

pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatCompletionResponse>, ServerError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::MalformedRequest(e.to_string()))?;
    handle(&state, request).await.map(Json)
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "active",
        "service": "sarathi-relay",
        "provider": {
            "base_url": state.config.base_url,
            "endpoint": state.provider.endpoint(),
            "api_key_configured": state.config.api_key.is_some(),
        },
        "supported_languages": SUPPORTED_LANGUAGES,
        "models": MODELS,
    }))
}
