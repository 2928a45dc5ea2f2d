use anyhow::{anyhow, Result};
use sarathi_shared::{ChatCompletionResponse, ChatRequest, ErrorBody};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionStatus {
    Idle,
    Waiting,
    Error(String),
}

/// Outcome of one relay round trip, delivered to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayReply {
    Completion(String),
    Error(String),
}

/// POST one chat request to the relay and return the assistant text.
pub async fn post_chat(
    http: &reqwest::Client,
    chat_url: &str,
    request: &ChatRequest,
) -> Result<String> {
    let response = http.post(chat_url).json(request).send().await?;
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("relay returned {}", status));
        return Err(anyhow!(message));
    }

    let completion: ChatCompletionResponse = response.json().await?;
    completion
        .content()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("relay returned no choices"))
}

pub struct BackendClient {
    tx: mpsc::UnboundedSender<ChatRequest>,
    status: Arc<Mutex<ConnectionStatus>>,
}

impl BackendClient {
    pub fn new(server_url: &str) -> (Self, mpsc::UnboundedReceiver<RelayReply>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ChatRequest>();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel::<RelayReply>();
        let status = Arc::new(Mutex::new(ConnectionStatus::Idle));
        let chat_url = format!("{}/api/chat", server_url.trim_end_matches('/'));

        let client = Self {
            tx,
            status: status.clone(),
        };

        tokio::spawn(async move {
            let http = reqwest::Client::new();
            while let Some(request) = rx.recv().await {
                *status.lock().await = ConnectionStatus::Waiting;
                debug!("Sending {} messages to {}", request.messages.len(), chat_url);

                let reply = match post_chat(&http, &chat_url, &request).await {
                    Ok(content) => {
                        *status.lock().await = ConnectionStatus::Idle;
                        RelayReply::Completion(content)
                    }
                    Err(e) => {
                        error!("Chat request failed: {:#}", e);
                        *status.lock().await = ConnectionStatus::Error(e.to_string());
                        RelayReply::Error(e.to_string())
                    }
                };

                if reply_tx.send(reply).is_err() {
                    error!("Reply receiver dropped");
                    break;
                }
            }
        });

        (client, reply_rx)
    }

    pub async fn send_message(&self, request: ChatRequest) -> Result<()> {
        self.tx.send(request)?;
        Ok(())
    }

    pub async fn get_status(&self) -> ConnectionStatus {
        self.status.lock().await.clone()
    }
}
