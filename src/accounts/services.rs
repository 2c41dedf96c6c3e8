use std::sync::Arc;

use tracing::{error, info, instrument, warn, Instrument, Span};
use uuid::Uuid;

use super::{
    notifier::{EmailMessage, Notifier, SEND_EMAIL_TOPIC},
    repo::AccountRepository,
    repo_types::{Account, AccountDraft, NewAccount},
};
use crate::{
    auth::{
        jwt::{TokenCodec, LOGIN_TOKEN_TTL},
        password::PasswordHashing,
    },
    error::AccountError,
};

/// Hard ceiling on a single page of `list_accounts`.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: String,
}

/// Account rules: uniqueness, password handling, token issuance and page bounds.
///
/// Holds no mutable state; every call is independent. Operation spans hang off
/// `telemetry`, which may be `Span::none()`.
#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    notifier: Arc<dyn Notifier>,
    tokens: TokenCodec,
    passwords: PasswordHashing,
    telemetry: Span,
}

impl AccountService {
    pub fn new(
        repo: Arc<dyn AccountRepository>,
        notifier: Arc<dyn Notifier>,
        tokens: TokenCodec,
        passwords: PasswordHashing,
        telemetry: Span,
    ) -> Self {
        Self {
            repo,
            notifier,
            tokens,
            passwords,
            telemetry,
        }
    }

    /// Uniqueness is check-then-insert: two concurrent calls with the same email can
    /// both pass the lookup. Only a unique index in the store closes that window.
    #[instrument(parent = &self.telemetry, skip_all, fields(email = %new_account.email))]
    pub async fn create_account(&self, new_account: NewAccount) -> Result<Account, AccountError> {
        if new_account.password.is_empty() {
            warn!("empty password");
            return Err(AccountError::EmptyPassword);
        }

        match self.repo.find_by_email(&new_account.email).await {
            Ok(None) => {}
            Ok(Some(existing)) => {
                warn!(existing_id = %existing.id, "email already registered");
                return Err(AccountError::DuplicateEmail);
            }
            Err(e) => {
                error!(error = %e, "existing email lookup failed");
                return Err(AccountError::TransientStore);
            }
        }

        let password_hash = self.passwords.hash(&new_account.password).map_err(|e| {
            error!(error = %e, "password hashing failed");
            AccountError::TransientStore
        })?;

        let draft = AccountDraft {
            full_name: new_account.full_name,
            email: new_account.email,
            password_hash,
            country: new_account.country,
        };
        let account = self.repo.insert(&draft).await.map_err(|e| {
            error!(error = %e, "insert account failed");
            AccountError::TransientStore
        })?;

        self.publish_welcome_email(&account);
        info!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Detached: the caller never waits on, or hears about, the notifier.
    fn publish_welcome_email(&self, account: &Account) {
        let payload = match serde_json::to_vec(&EmailMessage::welcome(&account.email)) {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "encode welcome email failed");
                return;
            }
        };
        let notifier = Arc::clone(&self.notifier);
        let span = tracing::info_span!("publish_welcome_email", account_id = %account.id);
        tokio::spawn(
            async move {
                if let Err(e) = notifier.publish(SEND_EMAIL_TOPIC, payload).await {
                    warn!(error = %e, topic = SEND_EMAIL_TOPIC, "welcome email event dropped");
                }
            }
            .instrument(span),
        );
    }

    #[instrument(parent = &self.telemetry, skip(self))]
    pub async fn list_accounts(&self, after_id: &str, limit: u32) -> Result<Vec<Account>, AccountError> {
        if limit == 0 {
            warn!("no page limit provided");
            return Err(AccountError::MissingLimit);
        }
        if limit > MAX_PAGE_LIMIT {
            warn!("page limit above maximum");
            return Err(AccountError::LimitExceeded);
        }

        self.repo.find_page(after_id, limit).await.map_err(|e| {
            error!(error = %e, "list accounts failed");
            AccountError::TransientStore
        })
    }

    /// Every credentials failure comes back as the same `InvalidCredentials`;
    /// only the log line says which one it was.
    #[instrument(parent = &self.telemetry, skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AccountError> {
        if email.is_empty() || password.is_empty() {
            warn!("login with empty fields");
            return Err(AccountError::InvalidCredentials);
        }

        let account = match self.repo.find_by_email(email).await {
            Ok(Some(a)) => a,
            Ok(None) => {
                warn!("login unknown email");
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "find_by_email failed");
                return Err(AccountError::InvalidCredentials);
            }
        };

        match self.passwords.verify(password, &account.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(account_id = %account.id, "login invalid password");
                return Err(AccountError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, account_id = %account.id, "stored password hash unreadable");
                return Err(AccountError::InvalidCredentials);
            }
        }

        let token = self
            .tokens
            .issue(account.id, account.created_at, LOGIN_TOKEN_TTL)
            .map_err(|e| {
                error!(error = %e, "token signing failed");
                AccountError::TransientStore
            })?;

        info!(account_id = %account.id, "account logged in");
        Ok(LoginOutcome { account, token })
    }

    #[instrument(parent = &self.telemetry, skip_all)]
    pub async fn resolve_from_token(&self, token: &str) -> Result<Account, AccountError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            AccountError::InvalidToken
        })?;

        self.find_account(claims.user_id).await
    }

    async fn find_account(&self, id: Uuid) -> Result<Account, AccountError> {
        match self.repo.find_by_id(id).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) => {
                warn!(account_id = %id, "token subject no longer exists");
                Err(AccountError::AccountNotFound)
            }
            Err(e) => {
                error!(error = %e, account_id = %id, "find_by_id failed");
                Err(AccountError::AccountNotFound)
            }
        }
    }
}
