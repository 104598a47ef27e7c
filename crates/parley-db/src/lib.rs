pub mod config;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::policies::load_balancing::DefaultPolicy;
use tracing::info;

pub use config::StoreConfig;
pub use memory::MemoryStore;
pub use models::{ChannelRow, MessageRow};

use queries::Statements;

/// Access to the `channels` and `messages` tables.
///
/// Every method is a single round trip. Multi-step sequences (check then
/// insert, read then write the member list) are composed by callers and are
/// not atomic.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn channel_exists(&self, id: &str) -> Result<bool>;

    async fn insert_channel(&self, channel: &ChannelRow) -> Result<()>;

    async fn get_channel(&self, id: &str) -> Result<Option<ChannelRow>>;

    async fn delete_channel(&self, id: &str) -> Result<()>;

    /// `None` when the channel row does not exist. A null list reads as empty.
    async fn get_members(&self, channel_id: &str) -> Result<Option<Vec<String>>>;

    /// Overwrites the whole member list.
    async fn set_members(&self, channel_id: &str, members: &[String]) -> Result<()>;

    async fn insert_message(&self, message: &MessageRow) -> Result<()>;

    /// Messages of one channel in ascending timestamp order, optionally only
    /// those at or after `start_at`.
    async fn get_messages(
        &self,
        channel_id: &str,
        start_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRow>>;
}

/// CQL-backed store. Holds one session (a pooled connection set) for the
/// lifetime of the process; dropping it closes the connections.
pub struct Database {
    session: Session,
    stmts: Statements,
}

impl Database {
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.validate()?;

        let policy = DefaultPolicy::builder()
            .prefer_datacenter(config.local_datacenter.clone())
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy)
            .request_timeout(Some(config.request_timeout))
            .build();

        let session: Session = SessionBuilder::new()
            .known_nodes(&config.contact_points)
            .user(config.username.as_str(), config.password.as_str())
            .default_execution_profile_handle(profile.into_handle())
            .build()
            .await
            .with_context(|| {
                format!("connecting to {}", config.contact_points.join(","))
            })?;

        info!("Connected to store at {}", config.contact_points.join(","));

        migrations::run(&session, &config.keyspace, config.replication_factor).await?;

        let stmts = Statements::prepare(&session, &config.keyspace).await?;

        Ok(Self { session, stmts })
    }
}
