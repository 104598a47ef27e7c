use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use parley_types::api::{AddMemberRequest, StatusMessage};

use crate::error::ApiError;
use crate::non_blank;
use crate::state::AppState;

// Add and remove read the whole list, change it, and write it back. Two
// concurrent changes to one channel can lose an update.

/// PUT /channels/{channel_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    payload: Result<Json<AddMemberRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let Some(member) = non_blank(req.member) else {
        return Err(ApiError::Validation(
            "Invalid input, missing or empty member name.".into(),
        ));
    };

    let mut members = state
        .store
        .get_members(&channel_id)
        .await?
        .ok_or_else(ApiError::channel_not_found)?;

    if members.contains(&member) {
        debug!("'{}' is already a member of '{}'", member, channel_id);
        return Err(ApiError::Conflict(
            "Member already exists in the channel.".into(),
        ));
    }

    members.push(member);
    state.store.set_members(&channel_id, &members).await?;

    Ok((StatusCode::CREATED, Json(StatusMessage::new("Member added."))))
}

/// GET /channels/{channel_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let members = state
        .store
        .get_members(&channel_id)
        .await?
        .ok_or_else(ApiError::channel_not_found)?;

    Ok(Json(members))
}

/// DELETE /channels/{channel_id}/members/{member_id}
///
/// Removing someone who is not in the list is a 404, not a silent no-op.
pub async fn remove_member(
    State(state): State<AppState>,
    Path((channel_id, member_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let members = state
        .store
        .get_members(&channel_id)
        .await?
        .ok_or_else(ApiError::channel_not_found)?;

    if !members.contains(&member_id) {
        return Err(ApiError::NotFound("Member not found.".into()));
    }

    let remaining: Vec<String> = members.into_iter().filter(|m| *m != member_id).collect();
    state.store.set_members(&channel_id, &remaining).await?;

    debug!("Removed '{}' from '{}'", member_id, channel_id);
    Ok(StatusCode::NO_CONTENT)
}
