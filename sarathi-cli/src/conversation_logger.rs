use anyhow::Result;
use chrono::{DateTime, Local};
use sarathi_shared::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

const DEFAULT_LOG_DIR: &str = "conversation_logs";

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub timestamp: DateTime<Local>,
    pub language: String,
    pub entry_type: EntryType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EntryType {
    UserMessage { content: String },
    AssistantMessage { content: String },
    SystemNote { content: String },
}

pub struct ConversationLogger {
    current_log_file: Option<PathBuf>,
}

impl ConversationLogger {
    pub fn new() -> Result<Self> {
        Self::in_dir(DEFAULT_LOG_DIR)
    }

    pub fn in_dir(log_dir: impl AsRef<Path>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)?;
        }

        let session_start = Local::now();
        let filename = format!("conversation_{}.jsonl", session_start.format("%Y%m%d_%H%M%S"));
        let log_file = log_dir.join(filename);

        debug!("Starting conversation logger: {:?}", log_file);

        Ok(Self {
            current_log_file: Some(log_file),
        })
    }

    pub fn log_entry(&self, language: &str, entry_type: EntryType) -> Result<()> {
        if let Some(ref log_file) = self.current_log_file {
            let entry = ConversationEntry {
                timestamp: Local::now(),
                language: language.to_string(),
                entry_type,
            };

            let json = serde_json::to_string(&entry)?;

            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;

            writeln!(file, "{}", json)?;
            file.flush()?;
        }
        Ok(())
    }

    pub fn log_message(&self, language: &str, message: &ChatMessage) -> Result<()> {
        let content = message.content.clone();
        let entry_type = match message.role {
            MessageRole::User => EntryType::UserMessage { content },
            MessageRole::Assistant => EntryType::AssistantMessage { content },
            MessageRole::System => EntryType::SystemNote { content },
        };
        self.log_entry(language, entry_type)
    }

    pub fn get_current_log_path(&self) -> Option<&Path> {
        self.current_log_file.as_deref()
    }
}

impl Default for ConversationLogger {
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            error!("Failed to create conversation logger: {}", e);
            Self {
                current_log_file: None,
            }
        })
    }
}
