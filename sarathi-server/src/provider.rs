use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

const CHAT_PATH: &str = "/v1/indic_chat";
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected provider payload: {0}")]
    Malformed(String),
}

/// Outbound payload for the provider's chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub prompt: String,
    pub src_lang: &'static str,
    pub tgt_lang: &'static str,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct ProviderReply {
    response: String,
}

#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ProviderClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), CHAT_PATH);
        info!("Initializing provider client for {} (timeout {:?})", endpoint, timeout);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat turn and return the provider's reply text.
    pub async fn chat(
        &self,
        api_key: &str,
        request: &ProviderRequest,
    ) -> Result<String, ProviderError> {
        info!(
            src_lang = request.src_lang,
            tgt_lang = request.tgt_lang,
            prompt_chars = request.prompt.chars().count(),
            "Calling provider"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!("Provider request failed: {:?}", e);
                ProviderError::Transport(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Provider responded with {}: {} bytes", status, text.len());

        if !status.is_success() {
            return Err(ProviderError::Status {
                status,
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let reply: ProviderReply =
            serde_json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = ProviderClient::new("http://localhost:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/indic_chat");
    }

    #[test]
    fn request_serializes_language_tags() {
        let request = ProviderRequest {
            prompt: "hello".to_string(),
            src_lang: "kan_Knda",
            tgt_lang: "kan_Knda",
            system_prompt: String::new(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["prompt"], "hello");
        assert_eq!(value["src_lang"], "kan_Knda");
        assert_eq!(value["tgt_lang"], "kan_Knda");
    }

    #[test]
    fn reply_requires_response_field() {
        assert!(serde_json::from_str::<ProviderReply>(r#"{"text":"hi"}"#).is_err());
        let reply: ProviderReply = serde_json::from_str(r#"{"response":"hi","extra":1}"#).unwrap();
        assert_eq!(reply.response, "hi");
    }
}
