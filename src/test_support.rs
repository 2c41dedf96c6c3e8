//! Hand-rolled collaborators for unit tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    accounts::{
        notifier::Notifier,
        repo::AccountRepository,
        repo_types::{Account, AccountDraft, NewAccount},
        services::AccountService,
    },
    auth::{jwt::TokenCodec, password::PasswordHashing},
    config::DEFAULT_PASSWORD_HASH_COST,
};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET)
}

pub fn test_service(repo: Arc<dyn AccountRepository>, notifier: Arc<dyn Notifier>) -> AccountService {
    AccountService::new(
        repo,
        notifier,
        test_codec(),
        PasswordHashing::new(DEFAULT_PASSWORD_HASH_COST).expect("valid cost"),
        tracing::Span::none(),
    )
}

pub fn new_account(email: &str, password: &str) -> NewAccount {
    NewAccount {
        full_name: "Jane Doe".into(),
        email: email.into(),
        password: password.into(),
        country: Some("Nigeria".into()),
    }
}

/// Account store kept in a `Vec`, with switches to make reads or writes fail.
#[derive(Default)]
pub struct InMemoryAccountRepo {
    accounts: Mutex<Vec<Account>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryAccountRepo {
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().expect("lock").len()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Vec<Account>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(self.accounts.lock().expect("lock"))
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepo {
    async fn insert(&self, draft: &AccountDraft) -> anyhow::Result<Account> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("insert rejected");
        }
        let now = OffsetDateTime::now_utc();
        let account = Account {
            id: Uuid::new_v4(),
            full_name: draft.full_name.clone(),
            email: draft.email.clone(),
            password_hash: draft.password_hash.clone(),
            country: draft.country.clone(),
            created_at: now,
            updated_at: now,
        };
        self.accounts.lock().expect("lock").push(account.clone());
        Ok(account)
    }

    async fn find_page(&self, after_id: &str, limit: u32) -> anyhow::Result<Vec<Account>> {
        let accounts = self.read()?;
        let mut page: Vec<Account> = accounts
            .iter()
            .filter(|a| a.id.to_string().as_str() > after_id)
            .cloned()
            .collect();
        page.sort_by_key(|a| a.id);
        page.truncate(limit as usize);
        Ok(page)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let accounts = self.read()?;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let accounts = self.read()?;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }
}

/// Forwards every published event to a channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(String, Vec<u8>)>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, Vec<u8>)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> anyhow::Result<()> {
        self.tx.send((topic.to_string(), payload))?;
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> anyhow::Result<()> {
        anyhow::bail!("broker unreachable")
    }
}
