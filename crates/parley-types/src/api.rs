use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// -- Channels --

/// Body of `PUT /channels`. Fields are optional so that a missing `id` or
/// `owner` surfaces as a validation failure rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateChannelRequest {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub id: String,
    pub owner: String,
    pub topic: String,
}

// -- Members --

#[derive(Debug, Default, Deserialize)]
pub struct AddMemberRequest {
    pub member: Option<String>,
}

// -- Messages --

#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    pub text: Option<String>,
    pub author: Option<String>,
}

/// Query string of `GET /channels/{id}/messages`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    pub start_at: Option<String>,
    pub author: Option<String>,
}

impl MessageQuery {
    /// Builds the query from raw key/value pairs. When a key repeats, the
    /// first value wins; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "startAt" => {
                    query.start_at.get_or_insert(value);
                }
                "author" => {
                    query.author.get_or_insert(value);
                }
                _ => {}
            }
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub text: String,
    pub author: String,
    pub timestamp: String,
}

impl MessageResponse {
    pub fn new(text: String, author: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            text,
            author,
            timestamp: format_timestamp(timestamp),
        }
    }
}

// -- Shared --

/// Confirmation and error body: `{"message": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

/// ISO-8601 in UTC with millisecond precision, e.g. `2024-05-01T10:00:00.123Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_renders_with_millis_and_z() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
            + chrono::Duration::milliseconds(7);
        assert_eq!(format_timestamp(ts), "2024-05-01T10:00:00.007Z");
    }

    #[test]
    fn message_query_uses_camel_case() {
        let q: MessageQuery =
            serde_json::from_str(r#"{"startAt":"2024-05-01","author":"ann"}"#).unwrap();
        assert_eq!(q.start_at.as_deref(), Some("2024-05-01"));
        assert_eq!(q.author.as_deref(), Some("ann"));
    }

    #[test]
    fn repeated_query_keys_keep_first_value() {
        let pairs = [
            ("author", "a"),
            ("startAt", "2024-05-01"),
            ("author", "b"),
            ("startAt", "x"),
            ("limit", "10"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string()));

        let q = MessageQuery::from_pairs(pairs);
        assert_eq!(q.author.as_deref(), Some("a"));
        assert_eq!(q.start_at.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn status_message_omits_missing_error() {
        let body = serde_json::to_value(StatusMessage::new("Member added.")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Member added." }));
    }
}
