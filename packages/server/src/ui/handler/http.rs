//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};

use crate::{
    infrastructure::dto::http::{HealthDto, MessageDto},
    ui::{
        handler::identity::{optional_user_id, tip_id_from_path},
        state::AppState,
    },
    usecase::GetMessagesUseCase,
};

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Chat history of one tip room, oldest first
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Path(tip_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let tip_id = tip_id_from_path(tip_id)?;
    let viewer = optional_user_id(&headers);

    let usecase = GetMessagesUseCase::new(state.repository.clone());
    let messages = usecase
        .execute(&tip_id, viewer.as_ref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to load history of '{}': {}", tip_id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}
