//! HTTP client for the lesson tracker server

use anyhow::{bail, Result};
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    ClassInfo, CreateClassRequest, CreateLessonRequest, CreateStudentRequest, ErrorResponse,
    LessonCreatedResponse, LessonDeletedResponse, LessonInfo, NotificationInfo, StudentInfo,
};

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Classes
    pub async fn create_class(&self, name: &str, total_lessons: i64, phone_number: &str) -> Result<ClassInfo> {
        let resp = self
            .client
            .post(self.url("/classes"))
            .json(&CreateClassRequest {
                name: name.to_string(),
                total_lessons,
                phone_number: phone_number.to_string(),
            })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_classes(&self) -> Result<Vec<ClassInfo>> {
        let resp = self.client.get(self.url("/classes")).send().await?;
        decode(resp).await
    }

    pub async fn get_class(&self, id: &str) -> Result<ClassInfo> {
        let resp = self.client.get(self.url(&format!("/classes/{}", id))).send().await?;
        decode(resp).await
    }

    // Students
    pub async fn create_student(&self, class_id: &str, name: &str, phone_number: Option<String>) -> Result<StudentInfo> {
        let resp = self
            .client
            .post(self.url(&format!("/classes/{}/students", class_id)))
            .json(&CreateStudentRequest {
                name: name.to_string(),
                phone_number,
            })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_students(&self, class_id: &str) -> Result<Vec<StudentInfo>> {
        let resp = self
            .client
            .get(self.url(&format!("/classes/{}/students", class_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_student(&self, id: &str) -> Result<()> {
        let resp = self.client.delete(self.url(&format!("/students/{}", id))).send().await?;
        check(resp).await?;
        Ok(())
    }

    // Lessons
    pub async fn create_lesson(
        &self,
        class_id: &str,
        subject: &str,
        notes: Option<String>,
        lesson_date: Option<NaiveDate>,
    ) -> Result<LessonCreatedResponse> {
        let resp = self
            .client
            .post(self.url(&format!("/classes/{}/lessons", class_id)))
            .json(&CreateLessonRequest {
                subject: subject.to_string(),
                notes,
                lesson_date,
            })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn list_lessons(&self, class_id: &str) -> Result<Vec<LessonInfo>> {
        let resp = self
            .client
            .get(self.url(&format!("/classes/{}/lessons", class_id)))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn delete_lesson(&self, id: &str) -> Result<LessonDeletedResponse> {
        let resp = self.client.delete(self.url(&format!("/lessons/{}", id))).send().await?;
        decode(resp).await
    }

    // Notifications
    pub async fn list_notifications(&self, class_id: &str) -> Result<Vec<NotificationInfo>> {
        let resp = self
            .client
            .get(self.url(&format!("/classes/{}/notifications", class_id)))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    bail!("{}", error_message(status, &body));
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let resp = check(resp).await?;
    Ok(resp.json().await?)
}

/// Human-readable message for a failed request
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("{} ({})", err.error.details, status),
        Err(_) if body.is_empty() => format!("Server returned {}", status),
        Err(_) => format!("Server returned {}: {}", status, body),
    }
}
