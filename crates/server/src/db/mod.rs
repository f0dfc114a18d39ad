use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use shared::NotificationStatus;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use uuid::Uuid;

mod models;

pub use models::*;

const CLASS_SUMMARY_COLUMNS: &str = r#"
    c.id, c.name, c.total_lessons, c.phone_number,
    (SELECT COUNT(*) FROM lessons l WHERE l.class_id = c.id) AS completed_lessons,
    c.created_at
"#;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS classes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                total_lessons INTEGER NOT NULL DEFAULT 0,
                phone_number TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY,
                class_id TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                phone_number TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lessons (
                id TEXT PRIMARY KEY,
                class_id TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
                lesson_date TEXT NOT NULL DEFAULT CURRENT_DATE,
                subject TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                class_id TEXT NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                sent_at TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for index in [
            "CREATE INDEX IF NOT EXISTS idx_students_class_id ON students(class_id)",
            "CREATE INDEX IF NOT EXISTS idx_lessons_class_id ON lessons(class_id)",
            "CREATE INDEX IF NOT EXISTS idx_lessons_date ON lessons(lesson_date)",
            "CREATE INDEX IF NOT EXISTS idx_notifications_class_id ON notifications(class_id)",
        ] {
            sqlx::query(index).execute(&self.pool).await?;
        }

        tracing::info!("Database migrations completed");
        Ok(())
    }

    // Class operations
    pub async fn create_class(
        &self,
        name: &str,
        total_lessons: i64,
        phone_number: &str,
    ) -> Result<Class> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (id, name, total_lessons, phone_number)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, total_lessons, phone_number, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(total_lessons)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(class)
    }

    pub async fn get_class(&self, id: &str) -> Result<Option<Class>> {
        let class = sqlx::query_as::<_, Class>(
            "SELECT id, name, total_lessons, phone_number, created_at FROM classes WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(class)
    }

    pub async fn get_class_summary(&self, id: &str) -> Result<Option<ClassSummary>> {
        let sql = format!("SELECT {} FROM classes c WHERE c.id = ?", CLASS_SUMMARY_COLUMNS);
        let class = sqlx::query_as::<_, ClassSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    /// All classes, newest first, each with its current lesson count
    pub async fn list_classes(&self) -> Result<Vec<ClassSummary>> {
        let sql = format!(
            "SELECT {} FROM classes c ORDER BY c.created_at DESC, c.rowid DESC",
            CLASS_SUMMARY_COLUMNS
        );
        let classes = sqlx::query_as::<_, ClassSummary>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    // Student operations
    pub async fn create_student(
        &self,
        class_id: &str,
        name: &str,
        phone_number: Option<&str>,
    ) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (id, class_id, name, phone_number)
            VALUES (?, ?, ?, ?)
            RETURNING id, class_id, name, phone_number, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(class_id)
        .bind(name)
        .bind(phone_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn list_students(&self, class_id: &str) -> Result<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, class_id, name, phone_number, created_at FROM students WHERE class_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    pub async fn delete_student(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Lesson operations
    pub async fn insert_lesson(
        &self,
        class_id: &str,
        subject: &str,
        notes: &str,
        lesson_date: NaiveDate,
    ) -> Result<Lesson> {
        let lesson = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (id, class_id, lesson_date, subject, notes)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, class_id, lesson_date, subject, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(class_id)
        .bind(lesson_date.format("%Y-%m-%d").to_string())
        .bind(subject)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(lesson)
    }

    pub async fn get_lesson(&self, id: &str) -> Result<Option<Lesson>> {
        let lesson = sqlx::query_as::<_, Lesson>(
            "SELECT id, class_id, lesson_date, subject, notes, created_at FROM lessons WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lesson)
    }

    /// Lessons for a class, most recent lesson date first
    pub async fn list_lessons(&self, class_id: &str) -> Result<Vec<Lesson>> {
        let lessons = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT id, class_id, lesson_date, subject, notes, created_at
            FROM lessons
            WHERE class_id = ?
            ORDER BY lesson_date DESC, created_at DESC, rowid DESC
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lessons)
    }

    pub async fn delete_lesson(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_lessons(&self, class_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons WHERE class_id = ?")
            .bind(class_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Notification operations
    pub async fn insert_notification(
        &self,
        class_id: &str,
        message: &str,
        status: NotificationStatus,
        sent_at: DateTime<Utc>,
    ) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, class_id, message, sent_at, status)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, class_id, message, sent_at, status
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(class_id)
        .bind(message)
        .bind(sent_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    /// Notification history for a class, newest first
    pub async fn list_notifications(&self, class_id: &str) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, class_id, message, sent_at, status
            FROM notifications
            WHERE class_id = ?
            ORDER BY sent_at DESC, rowid DESC
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }
}

#[cfg(test)]
impl Database {
    pub async fn open_in_memory() -> Result<Self> {
        use sqlx::sqlite::SqliteConnectOptions;
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // One connection only: every in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_class() {
        let db = Database::open_in_memory().await.unwrap();

        let class = db.create_class("10-A", 40, "+905551234567").await.unwrap();
        assert_eq!(class.name, "10-A");
        assert_eq!(class.total_lessons, 40);
        assert!(class.created_at.is_some());

        let fetched = db.get_class(&class.id).await.unwrap().unwrap();
        assert_eq!(fetched.phone_number, "+905551234567");
        assert!(db.get_class("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_lessons_after_insert_and_delete() {
        let db = Database::open_in_memory().await.unwrap();
        let class = db.create_class("10-A", 40, "+905551234567").await.unwrap();

        let first = db.insert_lesson(&class.id, "Algebra", "", date(2024, 3, 1)).await.unwrap();
        db.insert_lesson(&class.id, "Geometry", "", date(2024, 3, 2)).await.unwrap();
        db.insert_lesson(&class.id, "Fractions", "", date(2024, 3, 3)).await.unwrap();
        assert_eq!(db.count_lessons(&class.id).await.unwrap(), 3);

        assert!(db.delete_lesson(&first.id).await.unwrap());
        assert_eq!(db.count_lessons(&class.id).await.unwrap(), 2);

        // Deleting twice is a no-op
        assert!(!db.delete_lesson(&first.id).await.unwrap());
        assert_eq!(db.count_lessons(&class.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_class_summary_reflects_current_lessons() {
        let db = Database::open_in_memory().await.unwrap();
        let a = db.create_class("10-A", 2, "+905551234567").await.unwrap();
        let b = db.create_class("10-B", 5, "+905559876543").await.unwrap();

        let lesson = db.insert_lesson(&a.id, "Algebra", "", date(2024, 3, 1)).await.unwrap();
        db.insert_lesson(&a.id, "Geometry", "", date(2024, 3, 2)).await.unwrap();

        let classes = db.list_classes().await.unwrap();
        assert_eq!(classes.len(), 2);
        // Newest first
        assert_eq!(classes[0].id, b.id);
        assert_eq!(classes[0].completed_lessons, 0);
        assert_eq!(classes[1].completed_lessons, 2);

        db.delete_lesson(&lesson.id).await.unwrap();
        let summary = db.get_class_summary(&a.id).await.unwrap().unwrap();
        assert_eq!(summary.completed_lessons, 1);
    }

    #[tokio::test]
    async fn test_lessons_listed_newest_date_first() {
        let db = Database::open_in_memory().await.unwrap();
        let class = db.create_class("10-A", 40, "+905551234567").await.unwrap();

        db.insert_lesson(&class.id, "Second", "", date(2024, 3, 2)).await.unwrap();
        db.insert_lesson(&class.id, "First", "notes", date(2024, 3, 1)).await.unwrap();
        db.insert_lesson(&class.id, "Third", "", date(2024, 3, 3)).await.unwrap();

        let subjects: Vec<String> = db
            .list_lessons(&class.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.subject)
            .collect();
        assert_eq!(subjects, vec!["Third", "Second", "First"]);

        let lessons = db.list_lessons(&class.id).await.unwrap();
        assert_eq!(lessons[2].lesson_date, "2024-03-01");
        assert_eq!(lessons[2].notes, "notes");
    }

    #[tokio::test]
    async fn test_lesson_requires_existing_class() {
        let db = Database::open_in_memory().await.unwrap();
        let result = db.insert_lesson("missing", "Algebra", "", date(2024, 3, 1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_notifications_listed_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        let class = db.create_class("10-A", 1, "+905551234567").await.unwrap();
        let now = Utc::now();

        db.insert_notification(&class.id, "older", NotificationStatus::Sent, now - Duration::minutes(5))
            .await
            .unwrap();
        let newest = db
            .insert_notification(&class.id, "newer", NotificationStatus::Pending, now)
            .await
            .unwrap();
        assert_eq!(newest.status(), NotificationStatus::Pending);

        let history = db.list_notifications(&class.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].message, "newer");
        assert_eq!(history[1].message, "older");
        assert_eq!(history[1].status(), NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn test_students_crud() {
        let db = Database::open_in_memory().await.unwrap();
        let class = db.create_class("10-A", 40, "+905551234567").await.unwrap();

        let ayse = db.create_student(&class.id, "Ayşe", Some("+905550000001")).await.unwrap();
        db.create_student(&class.id, "Mehmet", None).await.unwrap();

        let students = db.list_students(&class.id).await.unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].name, "Ayşe");
        assert!(students[1].phone_number.is_none());

        assert!(db.delete_student(&ayse.id).await.unwrap());
        assert_eq!(db.list_students(&class.id).await.unwrap().len(), 1);
    }
}
