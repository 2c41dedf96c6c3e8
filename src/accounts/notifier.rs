use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::instrument;

/// Topic the mailer listens on.
pub const SEND_EMAIL_TOPIC: &str = "notification.SendEmail";

/// Publish-only event sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn welcome(to: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Welcome to my microservice application".into(),
            body: "It's glad to have you onboard, thanks for checking it out".into(),
        }
    }
}

/// Publishes through Postgres `NOTIFY`; listeners `LISTEN` on the topic name.
#[derive(Clone)]
pub struct PgNotifier {
    db: PgPool,
}

impl PgNotifier {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Notifier for PgNotifier {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> anyhow::Result<()> {
        let payload = String::from_utf8(payload).context("notification payload is not utf-8")?;
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(topic)
            .bind(payload)
            .execute(&self.db)
            .await
            .with_context(|| format!("pg_notify {topic}"))?;
        Ok(())
    }
}
