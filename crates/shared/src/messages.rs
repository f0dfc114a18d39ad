use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Classes
// ============================================================================

/// A class together with its derived lesson count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub id: String,
    pub name: String,
    pub total_lessons: i64,
    pub phone_number: String,
    /// Number of lessons recorded for the class at the time of the read
    pub completed_lessons: i64,
    pub created_at: Option<String>,
}

impl ClassInfo {
    pub fn is_complete(&self) -> bool {
        self.completed_lessons >= self.total_lessons
    }

    /// Progress towards the lesson quota, clamped to 0..=100
    pub fn progress_percent(&self) -> u8 {
        if self.total_lessons <= 0 {
            return 100;
        }
        let percent = self.completed_lessons.max(0) * 100 / self.total_lessons;
        percent.min(100) as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    pub total_lessons: i64,
    pub phone_number: String,
}

// ============================================================================
// Students
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInfo {
    pub id: String,
    pub class_id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

// ============================================================================
// Lessons
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonInfo {
    pub id: String,
    pub class_id: String,
    pub lesson_date: String,
    pub subject: String,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub subject: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to today's date (UTC) when omitted
    #[serde(default)]
    pub lesson_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonCreatedResponse {
    pub lesson: LessonInfo,
    pub completed_lessons: i64,
    pub outcome: CompletionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDeletedResponse {
    pub completed_lessons: i64,
}

// ============================================================================
// Notifications
// ============================================================================

/// Delivery state of a completion notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Handed to the delivery channel successfully
    Sent,
    /// Recorded but the delivery channel reported a failure
    Pending,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Sent => "sent",
            NotificationStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown notification status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for NotificationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(NotificationStatus::Sent),
            "pending" => Ok(NotificationStatus::Pending),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationInfo {
    pub id: String,
    pub class_id: String,
    pub message: String,
    pub sent_at: String,
    pub status: NotificationStatus,
}

/// Result of evaluating a class for completion after a lesson was added
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// The class has not reached its quota yet
    Incomplete { remaining: i64 },
    /// The class is complete but was already notified earlier
    AlreadyComplete,
    /// A notification was recorded for this lesson
    Notified { notification: NotificationInfo },
    /// Completion was detected but recording the notification failed
    Failed { error: String },
}

impl CompletionOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self, CompletionOutcome::Incomplete { .. })
    }
}

// ============================================================================
// Misc
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub details: String,
}

/// Body returned by the server for every non-success response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn class(total: i64, completed: i64) -> ClassInfo {
        ClassInfo {
            id: "c1".to_string(),
            name: "10-A".to_string(),
            total_lessons: total,
            phone_number: "+905551234567".to_string(),
            completed_lessons: completed,
            created_at: None,
        }
    }

    #[test]
    fn test_class_progress() {
        assert_eq!(class(40, 0).progress_percent(), 0);
        assert_eq!(class(40, 10).progress_percent(), 25);
        assert_eq!(class(40, 45).progress_percent(), 100);
        assert_eq!(class(0, 0).progress_percent(), 100);
        assert!(!class(40, 39).is_complete());
        assert!(class(40, 40).is_complete());
    }

    #[test]
    fn test_notification_status_parsing() {
        assert_eq!("sent".parse::<NotificationStatus>(), Ok(NotificationStatus::Sent));
        assert_eq!("pending".parse::<NotificationStatus>(), Ok(NotificationStatus::Pending));
        assert_eq!(
            "delivered".parse::<NotificationStatus>(),
            Err(UnknownStatus("delivered".to_string()))
        );
        assert_eq!(NotificationStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_create_lesson_request_defaults() {
        let req: CreateLessonRequest = serde_json::from_str(r#"{"subject":"Fractions"}"#).unwrap();
        assert_eq!(req.subject, "Fractions");
        assert!(req.notes.is_none());
        assert!(req.lesson_date.is_none());

        let req: CreateLessonRequest =
            serde_json::from_str(r#"{"subject":"Fractions","lesson_date":"2024-03-01"}"#).unwrap();
        assert_eq!(req.lesson_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_completion_outcome_serialization() {
        let json = serde_json::to_string(&CompletionOutcome::Incomplete { remaining: 3 }).unwrap();
        assert!(json.contains("\"kind\":\"incomplete\""));
        assert!(json.contains("\"remaining\":3"));

        let json = serde_json::to_string(&CompletionOutcome::AlreadyComplete).unwrap();
        assert_eq!(json, r#"{"kind":"already_complete"}"#);

        let outcome: CompletionOutcome =
            serde_json::from_str(r#"{"kind":"failed","error":"disk full"}"#).unwrap();
        match outcome {
            CompletionOutcome::Failed { error } => assert_eq!(error, "disk full"),
            _ => panic!("Expected Failed variant"),
        }
        assert!(CompletionOutcome::AlreadyComplete.is_complete());
        assert!(!CompletionOutcome::Incomplete { remaining: 1 }.is_complete());
    }
}
