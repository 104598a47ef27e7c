use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use parley_db::StoreConfig;

pub const DEFAULT_LOG_FILTER: &str = "parley_server=debug,parley_api=debug,parley_db=info,tower_http=debug";

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Cassandra(StoreConfig),
    /// Non-persistent, for local development.
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub store: StoreBackend,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("PARLEY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("PARLEY_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PARLEY_PORT")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("PARLEY_HOST '{}'", host))?;

        let store = match var("PARLEY_STORE").as_deref().unwrap_or("cassandra") {
            "cassandra" => StoreBackend::Cassandra(store_config(&var)?),
            "memory" => StoreBackend::Memory,
            other => bail!("PARLEY_STORE must be 'cassandra' or 'memory', got '{}'", other),
        };

        Ok(Self { addr, store })
    }
}

fn store_config(var: &impl Fn(&str) -> Option<String>) -> Result<StoreConfig> {
    let defaults = StoreConfig::default();

    let contact_points = match var("PARLEY_CONTACT_POINTS") {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect(),
        None => defaults.contact_points,
    };

    let replication_factor = match var("PARLEY_REPLICATION_FACTOR") {
        Some(raw) => raw.parse().context("PARLEY_REPLICATION_FACTOR")?,
        None => defaults.replication_factor,
    };

    let request_timeout = match var("PARLEY_REQUEST_TIMEOUT_SECS") {
        Some(raw) => Duration::from_secs(raw.parse().context("PARLEY_REQUEST_TIMEOUT_SECS")?),
        None => defaults.request_timeout,
    };

    let config = StoreConfig {
        contact_points,
        local_datacenter: var("PARLEY_LOCAL_DC").unwrap_or(defaults.local_datacenter),
        username: var("PARLEY_DB_USER").unwrap_or(defaults.username),
        password: var("PARLEY_DB_PASSWORD").unwrap_or(defaults.password),
        keyspace: var("PARLEY_KEYSPACE").unwrap_or(defaults.keyspace),
        replication_factor,
        request_timeout,
    };
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());

        let StoreBackend::Cassandra(store) = config.store else {
            panic!("expected cassandra backend");
        };
        assert_eq!(store.contact_points, vec!["127.0.0.1:9042"]);
        assert_eq!(store.keyspace, "chatsystem");
        assert_eq!(store.replication_factor, 2);
        assert_eq!(store.local_datacenter, "datacenter1");
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PARLEY_HOST", "127.0.0.1"),
            ("PARLEY_PORT", "8080"),
            ("PARLEY_CONTACT_POINTS", "10.0.0.1:9042, 10.0.0.2:9042,"),
            ("PARLEY_KEYSPACE", "chat_dev"),
            ("PARLEY_REPLICATION_FACTOR", "3"),
            ("PARLEY_REQUEST_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());

        let StoreBackend::Cassandra(store) = config.store else {
            panic!("expected cassandra backend");
        };
        assert_eq!(store.contact_points, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
        assert_eq!(store.keyspace, "chat_dev");
        assert_eq!(store.replication_factor, 3);
        assert_eq!(store.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn memory_backend() {
        let config = load(&[("PARLEY_STORE", "memory"), ("PARLEY_KEYSPACE", "ignored here")]).unwrap();
        assert!(matches!(config.store, StoreBackend::Memory));
    }

    #[test]
    fn invalid_values_fail() {
        assert!(load(&[("PARLEY_PORT", "http")]).is_err());
        assert!(load(&[("PARLEY_STORE", "redis")]).is_err());
        assert!(load(&[("PARLEY_KEYSPACE", "chat-system")]).is_err());
        assert!(load(&[("PARLEY_REPLICATION_FACTOR", "0")]).is_err());
        assert!(load(&[("PARLEY_CONTACT_POINTS", " , ")]).is_err());
    }
}
