use anyhow::{Context, Result};
use scylla::client::session::Session;
use tracing::info;

/// Creates the keyspace and both tables if they are missing.
pub async fn run(session: &Session, keyspace: &str, replication_factor: u32) -> Result<()> {
    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {keyspace}
                 WITH REPLICATION = {{
                     'class': 'SimpleStrategy',
                     'replication_factor': {replication_factor}
                 }}"
            ),
            &[],
        )
        .await
        .with_context(|| format!("creating keyspace {keyspace}"))?;

    session
        .query_unpaged(
            format!(
                "CREATE TABLE IF NOT EXISTS {keyspace}.channels (
                     id      text PRIMARY KEY,
                     owner   text,
                     topic   text,
                     members list<text>
                 )"
            ),
            &[],
        )
        .await
        .context("creating channels table")?;

    session
        .query_unpaged(
            format!(
                "CREATE TABLE IF NOT EXISTS {keyspace}.messages (
                     channelid text,
                     timestamp timestamp,
                     author    text,
                     text      text,
                     PRIMARY KEY (channelid, timestamp)
                 ) WITH CLUSTERING ORDER BY (timestamp ASC)"
            ),
            &[],
        )
        .await
        .context("creating messages table")?;

    info!("Schema ready in keyspace {}", keyspace);
    Ok(())
}
