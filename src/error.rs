use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors returned by the account service to its callers.
///
/// Messages are fixed: underlying causes are logged where they happen and never
/// carried in the variant, so nothing from the store leaks to a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("password must not be empty")]
    EmptyPassword,

    #[error("filter limit must be provided")]
    MissingLimit,

    #[error("pagination limit max is 100")]
    LimitExceeded,

    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("account does not exist")]
    AccountNotFound,

    #[error("an error occurred, please try again later")]
    TransientStore,
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::EmptyPassword | AccountError::MissingLimit | AccountError::LimitExceeded => {
                StatusCode::BAD_REQUEST
            }
            AccountError::DuplicateEmail => StatusCode::CONFLICT,
            AccountError::InvalidCredentials
            | AccountError::InvalidToken
            | AccountError::AccountNotFound => StatusCode::UNAUTHORIZED,
            AccountError::TransientStore => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AccountError::EmptyPassword => "empty_password",
            AccountError::MissingLimit => "missing_limit",
            AccountError::LimitExceeded => "limit_exceeded",
            AccountError::DuplicateEmail => "duplicate_email",
            AccountError::InvalidCredentials => "invalid_credentials",
            AccountError::InvalidToken => "invalid_token",
            AccountError::AccountNotFound => "account_not_found",
            AccountError::TransientStore => "try_again",
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        for err in [
            AccountError::EmptyPassword,
            AccountError::MissingLimit,
            AccountError::LimitExceeded,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        for err in [
            AccountError::InvalidCredentials,
            AccountError::InvalidToken,
            AccountError::AccountNotFound,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn duplicate_email_is_conflict() {
        assert_eq!(
            AccountError::DuplicateEmail.into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn transient_error_body_is_generic() {
        let res = AccountError::TransientStore.into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"], "try_again");
        assert_eq!(body["message"], "an error occurred, please try again later");
    }
}
