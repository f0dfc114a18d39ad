//! Delivery channels for completion messages.
//!
//! No real message transport is wired in. Both channels simulate the send:
//! one writes a log line, the other appends to a per-class JSONL journal.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::{Config, DeliveryMode};

/// A message addressed to a class's contact channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Delivery {
    pub class_id: String,
    pub contact_channel: String,
    pub message: String,
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, delivery: &Delivery) -> Result<()>;
}

/// Build the channel selected in the configuration
pub fn from_config(config: &Config) -> Arc<dyn DeliveryChannel> {
    match config.notifications.delivery {
        DeliveryMode::Log => Arc::new(LogChannel),
        DeliveryMode::Journal => Arc::new(JournalChannel::new(config.journal_dir())),
    }
}

/// Writes each delivery as a single log line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

#[async_trait]
impl DeliveryChannel for LogChannel {
    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        tracing::info!(
            class_id = %delivery.class_id,
            "Notification to {}: {}",
            delivery.contact_channel,
            delivery.message
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub delivered_at: String,
}

/// Appends deliveries to `<base>/deliveries/<class_id>.jsonl`
#[derive(Debug, Clone)]
pub struct JournalChannel {
    base_path: PathBuf,
}

impl JournalChannel {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn journal_dir(&self) -> PathBuf {
        self.base_path.join("deliveries")
    }

    fn journal_file(&self, class_id: &str) -> PathBuf {
        self.journal_dir().join(format!("{}.jsonl", class_id))
    }

    /// Read back every delivery recorded for a class, oldest first
    pub async fn entries(&self, class_id: &str) -> Result<Vec<JournalEntry>> {
        let file_path = self.journal_file(class_id);

        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&file_path).await?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut entries = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse journal line: {}", e);
                }
            }
        }

        Ok(entries)
    }
}

#[async_trait]
impl DeliveryChannel for JournalChannel {
    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        fs::create_dir_all(self.journal_dir()).await?;

        let entry = JournalEntry {
            delivery: delivery.clone(),
            delivered_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.journal_file(&delivery.class_id))
            .await?;

        let mut json = serde_json::to_string(&entry)?;
        json.push('\n');
        file.write_all(json.as_bytes()).await?;

        tracing::info!(
            "Journaled notification to {} for class {}",
            delivery.contact_channel,
            delivery.class_id
        );
        Ok(())
    }
}
