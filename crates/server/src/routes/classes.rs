//! Class endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{ClassInfo, CreateClassRequest};

use super::{class_not_found, required};
use crate::{
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

/// Create a class
/// POST /classes
pub async fn create_class(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateClassRequest>,
) -> AppResult<(StatusCode, Json<ClassInfo>)> {
    let name = required(&req.name, "Class name")?;
    let phone_number = required(&req.phone_number, "Phone number")?;
    if req.total_lessons < 1 {
        return Err(AppError::BadRequest(
            "Total lesson count must be at least 1".to_string(),
        ));
    }

    let class = state
        .db
        .create_class(&name, req.total_lessons, &phone_number)
        .await?;

    tracing::info!(
        "Created class {} ({}) with {} lessons",
        class.name,
        class.id,
        class.total_lessons
    );

    Ok((
        StatusCode::CREATED,
        Json(ClassInfo {
            id: class.id,
            name: class.name,
            total_lessons: class.total_lessons,
            phone_number: class.phone_number,
            completed_lessons: 0,
            created_at: class.created_at,
        }),
    ))
}

/// List classes, newest first
/// GET /classes
pub async fn list_classes(State(state): State<AppState>) -> AppResult<Json<Vec<ClassInfo>>> {
    let classes = state.db.list_classes().await?;
    Ok(Json(classes.into_iter().map(ClassInfo::from).collect()))
}

/// GET /classes/:id
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ClassInfo>> {
    let class = state
        .db
        .get_class_summary(&id)
        .await?
        .ok_or_else(|| class_not_found(&id))?;
    Ok(Json(class.into()))
}
