use crate::adapters::storage::spaces::{ACCESS_KEY_ENV, SECRET_KEY_ENV};
use crate::domain::model::Credentials;
use crate::domain::ports::CredentialProvider;
use std::env;

/// Reads the access key pair from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    access_key_var: String,
    secret_key_var: String,
}

impl EnvCredentials {
    pub fn new(access_key_var: impl Into<String>, secret_key_var: impl Into<String>) -> Self {
        Self {
            access_key_var: access_key_var.into(),
            secret_key_var: secret_key_var.into(),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(ACCESS_KEY_ENV, SECRET_KEY_ENV)
    }
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Credentials {
        Credentials {
            access_key: env::var(&self.access_key_var).ok(),
            secret_key: env::var(&self.secret_key_var).ok(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(access_key, secret_key),
        }
    }
}

impl From<Credentials> for StaticCredentials {
    fn from(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentials {
    fn credentials(&self) -> Credentials {
        self.credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_credentials_missing_vars() {
        let provider = EnvCredentials::new(
            "SPACES_STORE_TEST_UNSET_KEY",
            "SPACES_STORE_TEST_UNSET_SECRET",
        );
        let creds = provider.credentials();
        assert!(creds.access_key.is_none());
        assert!(creds.secret_key.is_none());
    }

    #[test]
    fn test_static_credentials() {
        let creds = StaticCredentials::new("key", "secret").credentials();
        assert_eq!(creds.access_key.as_deref(), Some("key"));
        assert_eq!(creds.secret_key.as_deref(), Some("secret"));
    }
}
