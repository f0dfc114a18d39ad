//! Lesson endpoints
//!
//! Adding a lesson is what drives the completion workflow: the lesson is
//! written, the class's lesson count is read back, and the fresh count is
//! evaluated against the quota.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{
    CompletionOutcome, CreateLessonRequest, LessonCreatedResponse, LessonDeletedResponse,
    LessonInfo,
};

use super::{class_not_found, required};
use crate::{
    completion::NotificationOutcome,
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

/// GET /classes/:id/lessons
pub async fn list_lessons(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<Json<Vec<LessonInfo>>> {
    if state.db.get_class(&class_id).await?.is_none() {
        return Err(class_not_found(&class_id));
    }

    let lessons = state.db.list_lessons(&class_id).await?;
    Ok(Json(lessons.into_iter().map(LessonInfo::from).collect()))
}

/// Record a lesson and evaluate the class for completion
/// POST /classes/:id/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    AppJson(req): AppJson<CreateLessonRequest>,
) -> AppResult<(StatusCode, Json<LessonCreatedResponse>)> {
    let subject = required(&req.subject, "Lesson subject")?;
    let notes = req.notes.unwrap_or_default();
    let lesson_date = req.lesson_date.unwrap_or_else(|| Utc::now().date_naive());

    let class = state
        .db
        .get_class(&class_id)
        .await?
        .ok_or_else(|| class_not_found(&class_id))?;

    let _guard = state.class_locks.acquire(&class.id).await;

    let lesson = state
        .db
        .insert_lesson(&class.id, &subject, &notes, lesson_date)
        .await?;
    let completed_lessons = state.db.count_lessons(&class.id).await?;

    tracing::info!(
        "Lesson {} added to class {} ({}/{}, policy {:?})",
        lesson.id,
        class.id,
        completed_lessons,
        class.total_lessons,
        state.completion.policy()
    );

    let outcome = match state
        .completion
        .evaluate_and_notify(
            &class.id,
            &class.name,
            class.total_lessons,
            &class.phone_number,
            completed_lessons,
        )
        .await
    {
        Ok(NotificationOutcome::Incomplete { remaining }) => CompletionOutcome::Incomplete { remaining },
        Ok(NotificationOutcome::AlreadyComplete) => CompletionOutcome::AlreadyComplete,
        Ok(NotificationOutcome::Notified(notification)) => CompletionOutcome::Notified {
            notification: notification.into(),
        },
        // The lesson stays recorded; the caller learns the notification failed
        Err(e) => CompletionOutcome::Failed {
            error: e.to_string(),
        },
    };

    Ok((
        StatusCode::CREATED,
        Json(LessonCreatedResponse {
            lesson: lesson.into(),
            completed_lessons,
            outcome,
        }),
    ))
}

/// DELETE /lessons/:id
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LessonDeletedResponse>> {
    let lesson = state
        .db
        .get_lesson(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", id)))?;

    let _guard = state.class_locks.acquire(&lesson.class_id).await;

    if !state.db.delete_lesson(&id).await? {
        return Err(AppError::NotFound(format!("Lesson {} not found", id)));
    }
    let completed_lessons = state.db.count_lessons(&lesson.class_id).await?;

    tracing::info!(
        "Lesson {} removed from class {} ({} remaining)",
        id,
        lesson.class_id,
        completed_lessons
    );

    Ok(Json(LessonDeletedResponse { completed_lessons }))
}
