use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use tracing::debug;

use parley_db::MessageRow;
use parley_types::api::{MessageQuery, MessageResponse, SendMessageRequest, StatusMessage};

use crate::error::ApiError;
use crate::non_blank;
use crate::state::AppState;

/// PUT /channels/{channel_id}/messages
///
/// The channel is not required to exist. The timestamp is taken from the
/// server clock at millisecond precision, matching what the store keeps.
pub async fn send_message(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let text = req.text.filter(|t| !t.is_empty());
    let (Some(text), Some(author)) = (text, non_blank(req.author)) else {
        return Err(ApiError::Validation(
            "Invalid input, missing text or author.".into(),
        ));
    };

    state
        .store
        .insert_message(&MessageRow {
            channel_id,
            timestamp: Utc::now().trunc_subsecs(3),
            author,
            text,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(StatusMessage::new("Message added."))))
}

/// GET /channels/{channel_id}/messages?startAt=&author=
///
/// `startAt` narrows the store query. `author` cannot be expressed against
/// the table key, so it is applied to the fetched rows. A query string that
/// cannot be decoded means no filters; this endpoint does not fail on input.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    raw_query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = match raw_query {
        Ok(Query(pairs)) => MessageQuery::from_pairs(pairs),
        Err(rejection) => {
            debug!("Ignoring undecodable query string: {}", rejection.body_text());
            MessageQuery::default()
        }
    };
    let start_at = query.start_at.as_deref().and_then(|raw| {
        let parsed = parse_start_at(raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            debug!("Ignoring unparseable startAt '{}'", raw);
        }
        parsed
    });
    let author = query.author.as_deref().filter(|a| !a.is_empty());

    let rows = state.store.get_messages(&channel_id, start_at).await?;

    let messages: Vec<MessageResponse> = rows
        .into_iter()
        .filter(|row| author.is_none_or(|a| row.author == a))
        .map(|row| MessageResponse::new(row.text, row.author, row.timestamp))
        .collect();

    Ok(Json(messages))
}

/// Accepts RFC 3339 (`2024-05-01T10:00:00.123Z`), a date-time without
/// offset (read as UTC) or a bare date (midnight UTC).
pub fn parse_start_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(ts) = parse_rfc3339(raw) {
        return Some(ts);
    }
    // An unencoded `+` in the offset arrives as a space.
    if let Some(ts) = parse_rfc3339(&raw.replace(' ', "+")) {
        return Some(ts);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_own_timestamp_format() {
        let ts = parse_start_at("2024-05-01T10:00:00.123Z").unwrap();
        assert_eq!(
            ts,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                + chrono::Duration::milliseconds(123)
        );
    }

    #[test]
    fn converts_offsets_to_utc() {
        let ts = parse_start_at("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn tolerates_plus_decoded_as_space() {
        let ts = parse_start_at("2024-05-01T12:00:00 02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn naive_forms_are_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_start_at("2024-05-01T10:30:00"), Some(expected));
        assert_eq!(parse_start_at("2024-05-01 10:30:00"), Some(expected));
        assert_eq!(
            parse_start_at("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(parse_start_at(""), None);
        assert_eq!(parse_start_at("   "), None);
        assert_eq!(parse_start_at("yesterday"), None);
        assert_eq!(parse_start_at("2024-13-45"), None);
    }
}
