use std::time::Duration;

use anyhow::{Result, bail};

pub const DEFAULT_KEYSPACE: &str = "chatsystem";

/// Connection settings for the CQL store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub contact_points: Vec<String>,
    pub local_datacenter: String,
    pub username: String,
    pub password: String,
    pub keyspace: String,
    pub replication_factor: u32,
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1:9042".into()],
            local_datacenter: "datacenter1".into(),
            username: "cassandra".into(),
            password: "cassandra".into(),
            keyspace: DEFAULT_KEYSPACE.into(),
            replication_factor: 2,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// The keyspace name is spliced into DDL and statement text, so it is
    /// restricted to what CQL accepts as an unquoted identifier.
    pub fn validate(&self) -> Result<()> {
        if self.contact_points.is_empty() {
            bail!("at least one contact point is required");
        }
        if !is_valid_keyspace(&self.keyspace) {
            bail!("invalid keyspace name '{}'", self.keyspace);
        }
        if self.replication_factor == 0 {
            bail!("replication factor must be at least 1");
        }
        Ok(())
    }
}

pub fn is_valid_keyspace(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 48
        && !name.starts_with('_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn keyspace_names() {
        assert!(is_valid_keyspace("chatsystem"));
        assert!(is_valid_keyspace("chat_2"));
        assert!(!is_valid_keyspace(""));
        assert!(!is_valid_keyspace("_hidden"));
        assert!(!is_valid_keyspace("chat; DROP KEYSPACE x"));
        assert!(!is_valid_keyspace(&"k".repeat(49)));
    }

    #[test]
    fn rejects_empty_contact_points() {
        let config = StoreConfig {
            contact_points: vec![],
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_replication() {
        let config = StoreConfig {
            replication_factor: 0,
            ..StoreConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
