use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

mod classes;
mod health;
mod lessons;
mod notifications;
mod students;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Classes
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route("/classes/:id", get(classes::get_class))
        // Students
        .route(
            "/classes/:id/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/students/:id", delete(students::delete_student))
        // Lessons
        .route(
            "/classes/:id/lessons",
            get(lessons::list_lessons).post(lessons::create_lesson),
        )
        .route("/lessons/:id", delete(lessons::delete_lesson))
        // Notification history
        .route("/classes/:id/notifications", get(notifications::list_notifications))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Trim a required text field, rejecting blanks
fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn class_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Class {} not found", id))
}
