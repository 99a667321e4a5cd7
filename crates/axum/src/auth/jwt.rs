//! HMAC JWT validation.
//!
//! Tokens are signed with the reconciled `jwt-secret` of the login config,
//! using one of the HMAC algorithms selected by `jwt-algo`. Implements
//! [`Validator`](super::Validator) producing [`UserInfo`].
//!
//! ```rust,ignore
//! use loginsrv_axum::auth::{TokenAuth, jwt::JwtValidator};
//!
//! let validator = JwtValidator::new("s3cr3t", "HS512")?;
//! let auth = TokenAuth::new("jwt_token", validator);
//! ```

use crate::auth::Validator;
use anyhow::{Context, Result, anyhow, bail};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Claims of a loginsrv token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// The subject (user name).
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// The backend or oauth provider that authenticated the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Expiration time (seconds since epoch).
    pub exp: u64,
    /// How often the token was refreshed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

struct JwtValidatorInner {
    key: DecodingKey,
    validation: Validation,
}

/// JWT validator for tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtValidator {
    inner: Arc<JwtValidatorInner>,
}

impl JwtValidator {
    /// Build a validator for `secret`, signed with `algorithm`.
    ///
    /// Only `HS256`, `HS384` and `HS512` are accepted, since the secret is
    /// a shared key and not a key pair.
    pub fn new(secret: &str, algorithm: &str) -> Result<Self> {
        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| anyhow!("unknown jwt algorithm: {algorithm}"))?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("jwt algorithm {algorithm:?} is not supported, use HS256, HS384 or HS512");
        }
        if secret.is_empty() {
            bail!("jwt secret must not be empty");
        }

        Ok(Self {
            inner: Arc::new(JwtValidatorInner {
                key: DecodingKey::from_secret(secret.as_bytes()),
                validation: Validation::new(algorithm),
            }),
        })
    }

    /// The algorithm tokens must be signed with.
    pub fn algorithm(&self) -> Algorithm {
        self.inner.validation.algorithms[0]
    }
}

impl Validator for JwtValidator {
    type Claims = UserInfo;
    type Error = anyhow::Error;

    async fn validate(&self, token: &str) -> Result<UserInfo> {
        let data = decode::<UserInfo>(token, &self.inner.key, &self.inner.validation)
            .context("JWT validation failed")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{
        Validator,
        jwt::{JwtValidator, UserInfo},
    };
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn token(secret: &str, algorithm: Algorithm, exp: u64) -> String {
        let claims = UserInfo {
            sub: "bob".into(),
            origin: Some("simple".into()),
            exp,
            ..UserInfo::default()
        };
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn accepts_token_signed_with_secret() {
        let validator = JwtValidator::new("s3cr3t", "HS512").unwrap();
        assert_eq!(validator.algorithm(), Algorithm::HS512);

        let claims = validator
            .validate(&token("s3cr3t", Algorithm::HS512, now() + 3600))
            .await
            .unwrap();
        assert_eq!(claims.sub, "bob");
        assert_eq!(claims.origin.as_deref(), Some("simple"));
    }

    #[tokio::test]
    async fn rejects_other_secret() {
        let validator = JwtValidator::new("s3cr3t", "HS512").unwrap();
        let result = validator
            .validate(&token("other", Algorithm::HS512, now() + 3600))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_other_algorithm() {
        let validator = JwtValidator::new("s3cr3t", "HS256").unwrap();
        let result = validator
            .validate(&token("s3cr3t", Algorithm::HS512, now() + 3600))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let validator = JwtValidator::new("s3cr3t", "HS512").unwrap();
        let result = validator
            .validate(&token("s3cr3t", Algorithm::HS512, now() - 3600))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn rejects_key_pair_algorithms() {
        let err = JwtValidator::new("s3cr3t", "RS256").err().unwrap();
        assert_eq!(
            err.to_string(),
            "jwt algorithm RS256 is not supported, use HS256, HS384 or HS512"
        );
        assert!(JwtValidator::new("s3cr3t", "HS999").is_err());
    }

    #[test]
    fn rejects_empty_secret() {
        let err = JwtValidator::new("", "HS256").err().unwrap();
        assert_eq!(err.to_string(), "jwt secret must not be empty");
    }
}
