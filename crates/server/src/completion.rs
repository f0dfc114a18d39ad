//! Completion detection and notification dispatch.
//!
//! After a lesson is recorded the caller passes the class's fresh lesson count
//! to [`CompletionWorkflow::evaluate_and_notify`]. A class is complete once the
//! count reaches its lesson quota. Whether a complete class produces a new
//! notification depends on the configured [`TriggerPolicy`].
//!
//! Lesson insertion and notification insertion are independent writes. A
//! failed notification write is reported to the caller and never rolls the
//! lesson back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::NotificationStatus;
use std::sync::Arc;
use thiserror::Error;

use crate::config::TriggerPolicy;
use crate::db::{Database, Notification};
use crate::delivery::{Delivery, DeliveryChannel};

/// Completion message sent to a class's contact channel
pub fn completion_message(class_name: &str, total_required: i64) -> String {
    format!(
        "{} sınıfının ders sayısı doldu! Toplam {} ders tamamlandı.",
        class_name, total_required
    )
}

/// Persistence needed by the workflow
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(
        &self,
        class_id: &str,
        message: &str,
        status: NotificationStatus,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<Notification>;
}

#[async_trait]
impl NotificationStore for Database {
    async fn insert_notification(
        &self,
        class_id: &str,
        message: &str,
        status: NotificationStatus,
        sent_at: DateTime<Utc>,
    ) -> anyhow::Result<Notification> {
        Database::insert_notification(self, class_id, message, status, sent_at).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Incomplete,
    AlreadyComplete,
    Notify,
}

/// Decide what a lesson count means for a class, without side effects
pub fn decide(policy: TriggerPolicy, total_required: i64, completed_count: i64) -> Decision {
    if completed_count < total_required {
        return Decision::Incomplete;
    }
    match policy {
        TriggerPolicy::EveryLesson => Decision::Notify,
        // Only the lesson that crossed the quota: count - 1 < total <= count
        TriggerPolicy::Once if completed_count - 1 < total_required => Decision::Notify,
        TriggerPolicy::Once => Decision::AlreadyComplete,
    }
}

#[derive(Debug, Clone)]
pub enum NotificationOutcome {
    Incomplete { remaining: i64 },
    AlreadyComplete,
    Notified(Notification),
}

impl NotificationOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self, NotificationOutcome::Incomplete { .. })
    }
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("failed to record notification for class {class_id}: {source}")]
    Persistence {
        class_id: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub struct CompletionWorkflow<S> {
    store: S,
    delivery: Arc<dyn DeliveryChannel>,
    policy: TriggerPolicy,
}

impl<S: Clone> Clone for CompletionWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            delivery: Arc::clone(&self.delivery),
            policy: self.policy,
        }
    }
}

impl<S: NotificationStore> CompletionWorkflow<S> {
    pub fn new(store: S, delivery: Arc<dyn DeliveryChannel>, policy: TriggerPolicy) -> Self {
        Self {
            store,
            delivery,
            policy,
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Evaluate a class after a lesson insert and record a notification if due.
    ///
    /// `completed_count` must be the lesson count read after the insert.
    pub async fn evaluate_and_notify(
        &self,
        class_id: &str,
        class_name: &str,
        total_required: i64,
        contact_channel: &str,
        completed_count: i64,
    ) -> Result<NotificationOutcome, CompletionError> {
        match decide(self.policy, total_required, completed_count) {
            Decision::Incomplete => {
                return Ok(NotificationOutcome::Incomplete {
                    remaining: total_required - completed_count,
                });
            }
            Decision::AlreadyComplete => {
                tracing::debug!(
                    "Class {} already reached {} lessons, not notifying again",
                    class_id,
                    total_required
                );
                return Ok(NotificationOutcome::AlreadyComplete);
            }
            Decision::Notify => {}
        }

        let message = completion_message(class_name, total_required);
        let delivery = Delivery {
            class_id: class_id.to_string(),
            contact_channel: contact_channel.to_string(),
            message,
        };

        let status = match self.delivery.deliver(&delivery).await {
            Ok(()) => NotificationStatus::Sent,
            Err(e) => {
                tracing::warn!(
                    "Delivery to {} failed for class {}: {}",
                    contact_channel,
                    class_id,
                    e
                );
                NotificationStatus::Pending
            }
        };

        // Delivery has already happened here. A failed insert leaves no record,
        // and under `TriggerPolicy::Once` later lessons will not retry it.
        let notification = self
            .store
            .insert_notification(class_id, &delivery.message, status, Utc::now())
            .await
            .map_err(|e| {
                tracing::error!("Failed to record notification for class {}: {}", class_id, e);
                CompletionError::Persistence {
                    class_id: class_id.to_string(),
                    source: e.into(),
                }
            })?;

        tracing::info!(
            "Class {} completed {} lessons, notification {} recorded as {}",
            class_id,
            completed_count,
            notification.id,
            status
        );

        Ok(NotificationOutcome::Notified(notification))
    }
}
