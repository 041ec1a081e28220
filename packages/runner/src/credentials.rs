//! Credential resolution.
//!
//! A request names its credentials by reference (a secret ARN or any other
//! opaque key); resolvers turn the reference into a connection URL the
//! statement executor can use.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

const SECRET_ENV_PREFIX: &str = "SCRIPTRUN_SECRET_";
const FALLBACK_ENV: &str = "DATABASE_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub connection_url: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("connection_url", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no credential configured for {0}")]
    NotFound(String),
}

#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(&self, secret_ref: Option<&str>) -> Result<Credential, CredentialError>;
}

/// Resolves references from process environment variables.
///
/// `arn:aws:secretsmanager:...:secret:prod-db` maps to
/// `SCRIPTRUN_SECRET_ARN_AWS_SECRETSMANAGER_..._SECRET_PROD_DB`; a request
/// without a reference uses `DATABASE_URL`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentialResolver;

impl EnvCredentialResolver {
    pub fn env_key(secret_ref: &str) -> String {
        let normalized: String = secret_ref
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{SECRET_ENV_PREFIX}{normalized}")
    }
}

#[async_trait]
impl CredentialResolver for EnvCredentialResolver {
    async fn resolve(&self, secret_ref: Option<&str>) -> Result<Credential, CredentialError> {
        let key = match secret_ref.map(str::trim).filter(|r| !r.is_empty()) {
            Some(reference) => Self::env_key(reference),
            None => FALLBACK_ENV.to_string(),
        };

        std::env::var(&key)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|connection_url| Credential { connection_url })
            .ok_or(CredentialError::NotFound(key))
    }
}

/// Fixed reference table, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialResolver {
    default: Option<String>,
    entries: HashMap<String, String>,
}

impl StaticCredentialResolver {
    pub fn new(default: Option<String>) -> Self {
        Self {
            default,
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, secret_ref: impl Into<String>, url: impl Into<String>) -> Self {
        self.entries.insert(secret_ref.into(), url.into());
        self
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentialResolver {
    async fn resolve(&self, secret_ref: Option<&str>) -> Result<Credential, CredentialError> {
        let url = match secret_ref {
            Some(reference) => self.entries.get(reference),
            None => self.default.as_ref(),
        };
        url.cloned()
            .map(|connection_url| Credential { connection_url })
            .ok_or_else(|| CredentialError::NotFound(secret_ref.unwrap_or("<default>").to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_normalization() {
        assert_eq!(
            EnvCredentialResolver::env_key("arn:aws:secret:prod-db"),
            "SCRIPTRUN_SECRET_ARN_AWS_SECRET_PROD_DB"
        );
        assert_eq!(EnvCredentialResolver::env_key(" app "), "SCRIPTRUN_SECRET_APP");
    }

    #[tokio::test]
    async fn test_env_resolver_reads_variable() {
        std::env::set_var("SCRIPTRUN_SECRET_UNIT_TEST_REF", "sqlite::memory:");
        let credential = EnvCredentialResolver
            .resolve(Some("unit-test-ref"))
            .await
            .unwrap();
        assert_eq!(credential.connection_url, "sqlite::memory:");
    }

    #[tokio::test]
    async fn test_env_resolver_missing_variable() {
        let err = EnvCredentialResolver
            .resolve(Some("definitely-not-configured"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SCRIPTRUN_SECRET_DEFINITELY_NOT_CONFIGURED"));
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticCredentialResolver::new(Some("sqlite::memory:".into()))
            .with_entry("admin", "postgres://admin@localhost/app");
        assert_eq!(
            resolver.resolve(None).await.unwrap().connection_url,
            "sqlite::memory:"
        );
        assert_eq!(
            resolver.resolve(Some("admin")).await.unwrap().connection_url,
            "postgres://admin@localhost/app"
        );
        assert!(resolver.resolve(Some("other")).await.is_err());
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential {
            connection_url: "postgres://user:hunter2@db/app".into(),
        };
        assert!(!format!("{credential:?}").contains("hunter2"));
    }
}
