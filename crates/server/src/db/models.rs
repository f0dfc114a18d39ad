use shared::{ClassInfo, LessonInfo, NotificationInfo, NotificationStatus, StudentInfo};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Class {
    pub id: String,
    pub name: String,
    pub total_lessons: i64,
    pub phone_number: String,
    pub created_at: Option<String>,
}

/// A class row joined with its lesson count, computed at query time
#[derive(Debug, Clone, FromRow)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub total_lessons: i64,
    pub phone_number: String,
    pub completed_lessons: i64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Student {
    pub id: String,
    pub class_id: String,
    pub name: String,
    pub phone_number: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Lesson {
    pub id: String,
    pub class_id: String,
    pub lesson_date: String,
    pub subject: String,
    pub notes: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: String,
    pub class_id: String,
    pub message: String,
    pub sent_at: String,
    pub status: String,
}

impl Notification {
    pub fn status(&self) -> NotificationStatus {
        self.status.parse().unwrap_or_else(|e| {
            tracing::warn!("Notification {} has {}, treating as pending", self.id, e);
            NotificationStatus::Pending
        })
    }
}

impl From<ClassSummary> for ClassInfo {
    fn from(row: ClassSummary) -> Self {
        Self {
            id: row.id,
            name: row.name,
            total_lessons: row.total_lessons,
            phone_number: row.phone_number,
            completed_lessons: row.completed_lessons,
            created_at: row.created_at,
        }
    }
}

impl From<Student> for StudentInfo {
    fn from(row: Student) -> Self {
        Self {
            id: row.id,
            class_id: row.class_id,
            name: row.name,
            phone_number: row.phone_number,
            created_at: row.created_at,
        }
    }
}

impl From<Lesson> for LessonInfo {
    fn from(row: Lesson) -> Self {
        Self {
            id: row.id,
            class_id: row.class_id,
            lesson_date: row.lesson_date,
            subject: row.subject,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

impl From<Notification> for NotificationInfo {
    fn from(row: Notification) -> Self {
        let status = row.status();
        Self {
            id: row.id,
            class_id: row.class_id,
            message: row.message,
            sent_at: row.sent_at,
            status,
        }
    }
}
