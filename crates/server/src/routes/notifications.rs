use axum::{
    extract::{Path, State},
    Json,
};
use shared::NotificationInfo;

use super::class_not_found;
use crate::{error::AppResult, state::AppState};

/// Notification history, newest first
/// GET /classes/:id/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<Json<Vec<NotificationInfo>>> {
    if state.db.get_class(&class_id).await?.is_none() {
        return Err(class_not_found(&class_id));
    }

    let notifications = state.db.list_notifications(&class_id).await?;
    Ok(Json(
        notifications.into_iter().map(NotificationInfo::from).collect(),
    ))
}
