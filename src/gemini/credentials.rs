use crate::{
    config::non_empty_env,
    error::{Result, StudioError},
};

/// Supplies the API key for each outgoing call.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

#[derive(Clone)]
pub struct StaticCredentials {
    api_key: String,
}

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(StudioError::ConfigError("API key is empty".into()));
        }
        Ok(self.api_key.clone())
    }
}

/// Reads the key from the environment on every call, so a key swapped
/// while the process runs is picked up by the next attempt.
#[derive(Clone, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub const KEYS: [&'static str; 3] = ["GEMINI_API_KEY", "API_KEY", "GOOGLE_API_KEY"];
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<String> {
        Self::KEYS
            .iter()
            .find_map(|key| non_empty_env(key))
            .ok_or_else(|| {
                StudioError::ConfigError(
                    "GEMINI_API_KEY, API_KEY or GOOGLE_API_KEY not set".into(),
                )
            })
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credentials() {
        assert_eq!(StaticCredentials::new("abc").api_key().unwrap(), "abc");
        assert!(StaticCredentials::new("  ").api_key().is_err());
        assert!(!format!("{:?}", StaticCredentials::new("secret")).contains("secret"));
    }
}
