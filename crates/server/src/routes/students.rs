use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{CreateStudentRequest, StudentInfo};

use super::{class_not_found, required};
use crate::{
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

/// GET /classes/:id/students
pub async fn list_students(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<Json<Vec<StudentInfo>>> {
    if state.db.get_class(&class_id).await?.is_none() {
        return Err(class_not_found(&class_id));
    }

    let students = state.db.list_students(&class_id).await?;
    Ok(Json(students.into_iter().map(StudentInfo::from).collect()))
}

/// POST /classes/:id/students
pub async fn create_student(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    AppJson(req): AppJson<CreateStudentRequest>,
) -> AppResult<(StatusCode, Json<StudentInfo>)> {
    let name = required(&req.name, "Student name")?;
    let phone_number = req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if state.db.get_class(&class_id).await?.is_none() {
        return Err(class_not_found(&class_id));
    }

    let student = state
        .db
        .create_student(&class_id, &name, phone_number)
        .await?;
    Ok((StatusCode::CREATED, Json(student.into())))
}

/// DELETE /students/:id
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if state.db.delete_student(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Student {} not found", id)))
    }
}
