pub mod channels;
pub mod error;
pub mod members;
pub mod messages;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, put},
};

pub use error::ApiError;
pub use state::{AppState, AppStateInner};

/// All channel, member and message routes, bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/channels", put(channels::create_channel))
        .route(
            "/channels/{channel_id}",
            get(channels::get_channel).delete(channels::delete_channel),
        )
        .route(
            "/channels/{channel_id}/members",
            put(members::add_member).get(members::list_members),
        )
        .route(
            "/channels/{channel_id}/members/{member_id}",
            delete(members::remove_member),
        )
        .route(
            "/channels/{channel_id}/messages",
            put(messages::send_message).get(messages::get_messages),
        )
        .with_state(state)
}

/// Returns the value only if it has something besides whitespace.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
