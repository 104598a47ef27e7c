//! Store row types. Distinct from the parley-types wire models to keep the
//! store layer independent of the HTTP surface.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRow {
    pub id: String,
    pub owner: String,
    pub topic: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub text: String,
}
