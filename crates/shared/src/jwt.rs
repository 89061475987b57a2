//! JWT validation for actor tokens.
//!
//! Tokens are issued by the site's identity provider and carry the actor's
//! uid, display name, mail and the flat list of permissions granted through
//! their roles. Production deployments verify RS256 signatures with the
//! provider's public key; HS256 shared secrets are supported for local
//! development and tests, and are the only mode able to mint tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Actor token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as a decimal string)
    pub sub: String,
    /// Display name of the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Account mail address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// Permissions granted to the account
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

/// Configuration for JWT validation (and signing, for shared secrets).
#[derive(Clone)]
pub struct JwtConfig {
    decoding_key: DecodingKey,
    encoding_key: Option<EncodingKey>,
    algorithm: Algorithm,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .field("can_sign", &self.encoding_key.is_some())
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Creates a validating config from an RSA public key in PEM format.
    pub fn with_public_key(public_key_pem: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            decoding_key,
            encoding_key: None,
            algorithm: Algorithm::RS256,
            leeway_secs,
        })
    }

    /// Creates an HS256 config from a shared secret. Able to issue tokens.
    pub fn with_secret(secret: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("Shared secret is empty".to_string()));
        }

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            algorithm: Algorithm::HS256,
            leeway_secs,
        })
    }

    /// Issues an access token for the given account.
    ///
    /// Returns the encoded token and its jti.
    pub fn issue_token(
        &self,
        uid: i64,
        name: Option<&str>,
        mail: Option<&str>,
        permissions: &[&str],
        expiry_secs: i64,
    ) -> Result<(String, String), JwtError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| JwtError::InvalidKey("No signing key configured".to_string()))?;

        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: uid.to_string(),
            name: name.map(str::to_string),
            mail: mail.map(str::to_string),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok((token, jti))
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extracts the numeric uid from validated claims.
///
/// Uid 0 is reserved for the anonymous account and never appears in tokens.
pub fn extract_uid(claims: &Claims) -> Result<i64, JwtError> {
    match claims.sub.parse::<i64>() {
        Ok(uid) if uid > 0 => Ok(uid),
        _ => Err(JwtError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::with_secret("test_secret_key_for_jwt_testing_12345", 0).unwrap()
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = create_test_config();

        let (token, jti) = config
            .issue_token(
                42,
                Some("editor"),
                Some("editor@example.com"),
                &["administer registration"],
                900,
            )
            .unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.jti, jti);
        assert_eq!(claims.name.as_deref(), Some("editor"));
        assert_eq!(claims.permissions, vec!["administer registration"]);
    }

    #[test]
    fn test_expired_token() {
        let config = create_test_config();

        let (token, _) = config.issue_token(1, None, None, &[], -120).unwrap();

        let result = config.validate_token(&token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let issuer = JwtConfig::with_secret("another_secret_entirely", 0).unwrap();
        let (token, _) = issuer.issue_token(7, None, None, &[], 900).unwrap();

        let result = create_test_config().validate_token(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            JwtConfig::with_secret("", 30),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_invalid_public_key_rejected() {
        assert!(matches!(
            JwtConfig::with_public_key("not a pem", 30),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_extract_uid() {
        let config = create_test_config();
        let (token, _) = config.issue_token(1234, None, None, &[], 900).unwrap();
        let claims = config.validate_token(&token).unwrap();

        assert_eq!(extract_uid(&claims).unwrap(), 1234);
    }

    #[test]
    fn test_extract_uid_rejects_anonymous_and_garbage() {
        let mut claims = Claims {
            sub: "0".to_string(),
            name: None,
            mail: None,
            permissions: vec![],
            exp: 0,
            iat: 0,
            jti: "x".to_string(),
        };
        assert!(extract_uid(&claims).is_err());

        claims.sub = "abc".to_string();
        assert!(extract_uid(&claims).is_err());
    }

    #[test]
    fn test_missing_permissions_claim_defaults_empty() {
        let json = r#"{"sub":"5","exp":1,"iat":0,"jti":"j"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(claims.permissions.is_empty());
        assert!(claims.name.is_none());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", create_test_config());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("test_secret_key"));
    }
}
