use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::statement::prepared::PreparedStatement;

use crate::models::{ChannelRow, MessageRow};
use crate::{ChatStore, Database};

type ChannelTuple = (String, Option<String>, Option<String>, Option<Vec<String>>);
type MessageTuple = (String, DateTime<Utc>, Option<String>, Option<String>);

/// Statements prepared once at startup, after the schema exists.
pub(crate) struct Statements {
    channel_exists: PreparedStatement,
    insert_channel: PreparedStatement,
    select_channel: PreparedStatement,
    delete_channel: PreparedStatement,
    select_members: PreparedStatement,
    update_members: PreparedStatement,
    insert_message: PreparedStatement,
    select_messages: PreparedStatement,
    select_messages_since: PreparedStatement,
}

impl Statements {
    pub(crate) async fn prepare(session: &Session, ks: &str) -> Result<Self> {
        Ok(Self {
            channel_exists: prepare_one(session, format!("SELECT id FROM {ks}.channels WHERE id = ?"))
                .await?,
            insert_channel: prepare_one(
                session,
                format!("INSERT INTO {ks}.channels (id, owner, topic, members) VALUES (?, ?, ?, ?)"),
            )
            .await?,
            select_channel: prepare_one(
                session,
                format!("SELECT id, owner, topic, members FROM {ks}.channels WHERE id = ?"),
            )
            .await?,
            delete_channel: prepare_one(session, format!("DELETE FROM {ks}.channels WHERE id = ?"))
                .await?,
            select_members: prepare_one(
                session,
                format!("SELECT id, members FROM {ks}.channels WHERE id = ?"),
            )
            .await?,
            update_members: prepare_one(
                session,
                format!("UPDATE {ks}.channels SET members = ? WHERE id = ?"),
            )
            .await?,
            insert_message: prepare_one(
                session,
                format!(
                    "INSERT INTO {ks}.messages (channelid, timestamp, author, text) VALUES (?, ?, ?, ?)"
                ),
            )
            .await?,
            select_messages: prepare_one(
                session,
                format!(
                    "SELECT channelid, timestamp, author, text FROM {ks}.messages WHERE channelid = ?"
                ),
            )
            .await?,
            select_messages_since: prepare_one(
                session,
                format!(
                    "SELECT channelid, timestamp, author, text FROM {ks}.messages
                     WHERE channelid = ? AND timestamp >= ?"
                ),
            )
            .await?,
        })
    }
}

async fn prepare_one(session: &Session, cql: String) -> Result<PreparedStatement> {
    session
        .prepare(cql.as_str())
        .await
        .with_context(|| format!("preparing `{cql}`"))
}

#[async_trait]
impl ChatStore for Database {
    async fn channel_exists(&self, id: &str) -> Result<bool> {
        let result = self
            .session
            .execute_unpaged(&self.stmts.channel_exists, (id,))
            .await?
            .into_rows_result()?;

        Ok(result.maybe_first_row::<(String,)>()?.is_some())
    }

    async fn insert_channel(&self, channel: &ChannelRow) -> Result<()> {
        self.session
            .execute_unpaged(
                &self.stmts.insert_channel,
                (
                    channel.id.as_str(),
                    channel.owner.as_str(),
                    channel.topic.as_str(),
                    &channel.members,
                ),
            )
            .await?;
        Ok(())
    }

    async fn get_channel(&self, id: &str) -> Result<Option<ChannelRow>> {
        let result = self
            .session
            .execute_unpaged(&self.stmts.select_channel, (id,))
            .await?
            .into_rows_result()?;

        let row = result
            .maybe_first_row::<ChannelTuple>()?
            .map(|(id, owner, topic, members)| ChannelRow {
                id,
                owner: owner.unwrap_or_default(),
                topic: topic.unwrap_or_default(),
                members: members.unwrap_or_default(),
            });

        Ok(row)
    }

    async fn delete_channel(&self, id: &str) -> Result<()> {
        self.session
            .execute_unpaged(&self.stmts.delete_channel, (id,))
            .await?;
        Ok(())
    }

    async fn get_members(&self, channel_id: &str) -> Result<Option<Vec<String>>> {
        let result = self
            .session
            .execute_unpaged(&self.stmts.select_members, (channel_id,))
            .await?
            .into_rows_result()?;

        let members = result
            .maybe_first_row::<(String, Option<Vec<String>>)>()?
            .map(|(_, members)| members.unwrap_or_default());

        Ok(members)
    }

    async fn set_members(&self, channel_id: &str, members: &[String]) -> Result<()> {
        self.session
            .execute_unpaged(&self.stmts.update_members, (members.to_vec(), channel_id))
            .await?;
        Ok(())
    }

    async fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.session
            .execute_unpaged(
                &self.stmts.insert_message,
                (
                    message.channel_id.as_str(),
                    message.timestamp,
                    message.author.as_str(),
                    message.text.as_str(),
                ),
            )
            .await?;
        Ok(())
    }

    async fn get_messages(
        &self,
        channel_id: &str,
        start_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRow>> {
        let result = match start_at {
            Some(start_at) => {
                self.session
                    .execute_unpaged(&self.stmts.select_messages_since, (channel_id, start_at))
                    .await?
            }
            None => {
                self.session
                    .execute_unpaged(&self.stmts.select_messages, (channel_id,))
                    .await?
            }
        }
        .into_rows_result()?;

        // Clustering order already sorts by timestamp ascending.
        let rows = result
            .rows::<MessageTuple>()?
            .map(|row| {
                row.map(|(channel_id, timestamp, author, text)| MessageRow {
                    channel_id,
                    timestamp,
                    author: author.unwrap_or_default(),
                    text: text.unwrap_or_default(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
