use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// The most variations a single run will ask for.
pub const MAX_TARGET_COUNT: usize = 4;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("API_KEY"));
        let base_url = non_empty_env("GEMINI_API_BASE")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);
        let model = non_empty_env("GEMINI_IMAGE_MODEL").unwrap_or(defaults.model);
        let timeout = non_empty_env("GEMINI_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        GeminiConfig {
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Retry, backoff and pacing knobs for one variation run.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationPolicy {
    pub target_count: usize,
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: u32,
    pub pacing: Duration,
}

impl Default for VariationPolicy {
    fn default() -> Self {
        VariationPolicy {
            target_count: MAX_TARGET_COUNT,
            max_attempts: 3,
            initial_backoff: Duration::from_secs(20),
            backoff_multiplier: 2,
            pacing: Duration::from_secs(8),
        }
    }
}

impl VariationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(count) = env_parse::<usize>("STUDIO_TARGET_COUNT") {
            policy = policy.with_target_count(count);
        }
        if let Some(attempts) = env_parse::<u32>("STUDIO_MAX_ATTEMPTS") {
            policy.max_attempts = attempts.max(1);
        }
        if let Some(secs) = env_parse::<u64>("STUDIO_BACKOFF_SECS") {
            policy.initial_backoff = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("STUDIO_PACING_SECS") {
            policy.pacing = Duration::from_secs(secs);
        }
        policy
    }

    /// Clamped to `1..=MAX_TARGET_COUNT`.
    pub fn with_target_count(mut self, count: usize) -> Self {
        self.target_count = count.clamp(1, MAX_TARGET_COUNT);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, multiplier: u32) -> Self {
        self.initial_backoff = initial;
        self.backoff_multiplier = multiplier.max(1);
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub policy: VariationPolicy,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini: GeminiConfig::default(),
            policy: VariationPolicy::default(),
            output_dir: PathBuf::from("generated"),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let output_dir = non_empty_env("STUDIO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("generated"));

        Config {
            gemini: GeminiConfig::from_env(),
            policy: VariationPolicy::from_env(),
            output_dir,
        }
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = config;
        self
    }

    pub fn with_policy(mut self, policy: VariationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_env(key).and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = VariationPolicy::default();
        assert_eq!(policy.target_count, 4);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_secs(20));
        assert_eq!(policy.backoff_multiplier, 2);
        assert_eq!(policy.pacing, Duration::from_secs(8));
    }

    #[test]
    fn test_policy_builders_clamp() {
        let policy = VariationPolicy::new()
            .with_target_count(9)
            .with_max_attempts(0)
            .with_backoff(Duration::from_secs(1), 0);
        assert_eq!(policy.target_count, MAX_TARGET_COUNT);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff_multiplier, 1);
        assert_eq!(VariationPolicy::new().with_target_count(0).target_count, 1);
    }

    #[test]
    fn test_gemini_builders() {
        let config = GeminiConfig::new()
            .with_api_key("k")
            .with_base_url("http://localhost:9999")
            .with_model("m");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.model, "m");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_policy_from_env_overrides() {
        env::set_var("STUDIO_TARGET_COUNT", "2");
        env::set_var("STUDIO_PACING_SECS", "1");
        let policy = VariationPolicy::from_env();
        env::remove_var("STUDIO_TARGET_COUNT");
        env::remove_var("STUDIO_PACING_SECS");

        assert_eq!(policy.target_count, 2);
        assert_eq!(policy.pacing, Duration::from_secs(1));
        assert_eq!(policy.initial_backoff, Duration::from_secs(20));
    }
}
