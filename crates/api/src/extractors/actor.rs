//! Acting account extractor.
//!
//! Requests carrying a Bearer token act as the account named in its claims.
//! Requests without an Authorization header act as the anonymous account
//! with the configured anonymous permissions.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Account;
use shared::jwt::{extract_uid, Claims};

use crate::app::AppState;
use crate::error::ApiError;

/// The account performing the request.
#[derive(Debug, Clone)]
pub struct Actor(pub Account);

impl Actor {
    pub fn account(&self) -> &Account {
        &self.0
    }
}

/// Builds the account described by validated claims.
pub fn account_from_claims(claims: &Claims) -> Result<Account, ApiError> {
    let uid = extract_uid(claims)?;
    let name = claims
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("user{}", uid));

    let mut account = Account::authenticated(uid, name, claims.permissions.iter().cloned());
    if let Some(mail) = claims.mail.as_deref().filter(|m| !m.is_empty()) {
        account = account.with_mail(mail);
    }
    Ok(account)
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get("Authorization") else {
            return Ok(Actor(Account::anonymous(
                state.config.registration.anonymous_permissions.iter().cloned(),
            )));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized("Invalid Authorization header format".to_string())
            })?;

        let claims = state.jwt.validate_token(token.trim())?;
        Ok(Actor(account_from_claims(&claims)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            name: Some("ada".to_string()),
            mail: Some("ada@example.com".to_string()),
            permissions: vec!["create conference registration self".to_string()],
            exp: 0,
            iat: 0,
            jti: "jti".to_string(),
        }
    }

    #[test]
    fn test_account_from_claims() {
        let account = account_from_claims(&claims("12")).unwrap();

        assert_eq!(account.uid, 12);
        assert_eq!(account.name.as_deref(), Some("ada"));
        assert_eq!(account.mail.as_deref(), Some("ada@example.com"));
        assert!(account.is_authenticated());
        assert!(account.has_permission("create conference registration self"));
    }

    #[test]
    fn test_account_name_falls_back_to_uid() {
        let mut claims = claims("5");
        claims.name = None;
        claims.mail = Some(String::new());

        let account = account_from_claims(&claims).unwrap();

        assert_eq!(account.display_name(), "user5");
        assert_eq!(account.mail, None);
    }

    #[test]
    fn test_anonymous_subject_rejected() {
        assert!(matches!(
            account_from_claims(&claims("0")),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
