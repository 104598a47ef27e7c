use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, info};

use parley_db::ChannelRow;
use parley_types::api::{ChannelResponse, CreateChannelRequest, CreateChannelResponse};

use crate::error::ApiError;
use crate::non_blank;
use crate::state::AppState;

/// PUT /channels
///
/// The existence check and the insert are separate round trips, so two
/// concurrent creates of the same id can both succeed (last write wins).
pub async fn create_channel(
    State(state): State<AppState>,
    payload: Result<Json<CreateChannelRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let (Some(id), Some(owner)) = (non_blank(req.id), non_blank(req.owner)) else {
        return Err(ApiError::Validation(
            "Invalid input, missing id or owner.".into(),
        ));
    };

    if state.store.channel_exists(&id).await? {
        debug!("Channel '{}' already exists", id);
        return Err(ApiError::Conflict(
            "The channel with such id already exists.".into(),
        ));
    }

    state
        .store
        .insert_channel(&ChannelRow {
            id: id.clone(),
            owner: owner.clone(),
            topic: req.topic.unwrap_or_default(),
            members: vec![owner],
        })
        .await?;

    info!("Created channel '{}'", id);
    Ok((StatusCode::CREATED, Json(CreateChannelResponse { id })))
}

/// GET /channels/{channel_id}
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let channel = state
        .store
        .get_channel(&channel_id)
        .await?
        .ok_or_else(ApiError::channel_not_found)?;

    Ok(Json(ChannelResponse {
        id: channel.id,
        owner: channel.owner,
        topic: channel.topic,
    }))
}

/// DELETE /channels/{channel_id}
///
/// Only the channel row goes away; its messages stay in the store.
pub async fn delete_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.channel_exists(&channel_id).await? {
        return Err(ApiError::channel_not_found());
    }

    state.store.delete_channel(&channel_id).await?;

    info!("Deleted channel '{}'", channel_id);
    Ok(StatusCode::NO_CONTENT)
}
