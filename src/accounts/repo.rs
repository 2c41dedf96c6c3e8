use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::repo_types::{Account, AccountDraft};

/// Persistence contract consumed by the account service.
///
/// Lookups return `Ok(None)` for "not found"; `Err` is reserved for store failures.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Persist a new account. The store assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, draft: &AccountDraft) -> anyhow::Result<Account>;

    /// Up to `limit` accounts whose id sorts strictly after `after_id`, ascending.
    /// An empty `after_id` starts from the beginning.
    async fn find_page(&self, after_id: &str, limit: u32) -> anyhow::Result<Vec<Account>>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
}

/// How a text cursor maps onto the uuid primary key.
///
/// Postgres orders uuids bytewise, which matches the byte order of their canonical
/// lowercase text. A canonical cursor can therefore use the index directly. Anything
/// else is compared as text in byte order (`COLLATE "C"`).
#[derive(Debug, PartialEq, Eq)]
enum PageCursor<'a> {
    Start,
    AfterId(Uuid),
    AfterText(&'a str),
}

impl<'a> PageCursor<'a> {
    fn parse(after_id: &'a str) -> Self {
        if after_id.is_empty() {
            return PageCursor::Start;
        }
        match Uuid::parse_str(after_id) {
            Ok(id) if id.hyphenated().to_string() == after_id => PageCursor::AfterId(id),
            _ => PageCursor::AfterText(after_id),
        }
    }
}

#[derive(Clone)]
pub struct PgAccountRepo {
    db: PgPool,
}

impl PgAccountRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepo {
    #[instrument(skip_all, fields(db.system = "postgresql", email = %draft.email))]
    async fn insert(&self, draft: &AccountDraft) -> anyhow::Result<Account> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (full_name, email, password_hash, country)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, password_hash, country, created_at, updated_at
            "#,
        )
        .bind(&draft.full_name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .bind(&draft.country)
        .fetch_one(&self.db)
        .await
        .context("insert account")?;
        Ok(account)
    }

    #[instrument(skip(self), fields(db.system = "postgresql"))]
    async fn find_page(&self, after_id: &str, limit: u32) -> anyhow::Result<Vec<Account>> {
        let limit = i64::from(limit);
        let query = match PageCursor::parse(after_id) {
            PageCursor::Start => sqlx::query_as::<_, Account>(
                r#"
                SELECT id, full_name, email, password_hash, country, created_at, updated_at
                FROM accounts
                ORDER BY id ASC
                LIMIT $1
                "#,
            )
            .bind(limit),
            PageCursor::AfterId(id) => sqlx::query_as::<_, Account>(
                r#"
                SELECT id, full_name, email, password_hash, country, created_at, updated_at
                FROM accounts
                WHERE id > $1
                ORDER BY id ASC
                LIMIT $2
                "#,
            )
            .bind(id)
            .bind(limit),
            PageCursor::AfterText(text) => sqlx::query_as::<_, Account>(
                r#"
                SELECT id, full_name, email, password_hash, country, created_at, updated_at
                FROM accounts
                WHERE id::text COLLATE "C" > $1
                ORDER BY id ASC
                LIMIT $2
                "#,
            )
            .bind(text)
            .bind(limit),
        };
        let rows = query
            .fetch_all(&self.db)
            .await
            .context("list accounts page")?;
        Ok(rows)
    }

    #[instrument(skip(self), fields(db.system = "postgresql"))]
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, full_name, email, password_hash, country, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find account by email")?;
        Ok(account)
    }

    #[instrument(skip(self), fields(db.system = "postgresql"))]
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, full_name, email, password_hash, country, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find account by id")?;
        Ok(account)
    }
}
