//! Caller profiles and search configuration.

use crate::corpus::DEFAULT_POOL_SIZE;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who is asking, which decides model, budget and round ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Interactive lookups that should come back quickly.
    Fast,
    /// The default interactive search.
    Standard,
    /// Submitted jobs that may take longer.
    Background,
}

/// Settings for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub model: String,
    pub max_tokens: usize,
    /// Exchanges allowed to request tools before the answer is forced.
    pub round_ceiling: usize,
    /// Bound on a single exchange with the reasoning service.
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl ProfileConfig {
    pub fn new(model: impl Into<String>, max_tokens: usize, round_ceiling: usize) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            round_ceiling,
            timeout: Duration::from_secs(90),
            temperature: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_round_ceiling(mut self, round_ceiling: usize) -> Self {
        self.round_ceiling = round_ceiling;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

pub const DEFAULT_FAST_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Configuration for a [`crate::ManualSearch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub fast: ProfileConfig,
    pub standard: ProfileConfig,
    pub background: ProfileConfig,

    /// Connections in the full-text index pool.
    pub fts_pool_size: usize,

    /// Replaces the built-in system prompt.
    pub system_prompt: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fast: ProfileConfig::new(DEFAULT_FAST_MODEL, 1024, 2)
                .with_timeout(Duration::from_secs(30)),
            standard: ProfileConfig::new(DEFAULT_MODEL, 2048, 5),
            background: ProfileConfig::new(DEFAULT_MODEL, 2048, 6),
            fts_pool_size: DEFAULT_POOL_SIZE,
            system_prompt: None,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `MIDWINTER_MODEL`, `MIDWINTER_FAST_MODEL` and
    /// `MIDWINTER_TIMEOUT_SECS` when set.
    pub fn from_env() -> Result<Self> {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(model) = var("MIDWINTER_MODEL").filter(|m| !m.trim().is_empty()) {
            self.standard.model = model.clone();
            self.background.model = model;
        }
        if let Some(model) = var("MIDWINTER_FAST_MODEL").filter(|m| !m.trim().is_empty()) {
            self.fast.model = model;
        }
        if let Some(raw) = var("MIDWINTER_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Load(format!(
                    "MIDWINTER_TIMEOUT_SECS must be a whole number of seconds, got '{raw}'"
                ))
            })?;
            let timeout = Duration::from_secs(secs);
            self.fast.timeout = timeout;
            self.standard.timeout = timeout;
            self.background.timeout = timeout;
        }
        Ok(self)
    }

    pub fn profile(&self, profile: Profile) -> &ProfileConfig {
        match profile {
            Profile::Fast => &self.fast,
            Profile::Standard => &self.standard,
            Profile::Background => &self.background,
        }
    }

    /// Replace the settings for one profile.
    pub fn with_profile(mut self, profile: Profile, config: ProfileConfig) -> Self {
        match profile {
            Profile::Fast => self.fast = config,
            Profile::Standard => self.standard = config,
            Profile::Background => self.background = config,
        }
        self
    }

    pub fn with_fts_pool_size(mut self, size: usize) -> Self {
        self.fts_pool_size = size;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_ceilings() {
        let config = SearchConfig::default();
        assert_eq!(config.profile(Profile::Fast).round_ceiling, 2);
        assert_eq!(config.profile(Profile::Standard).round_ceiling, 5);
        assert_eq!(config.profile(Profile::Background).round_ceiling, 6);
        assert_eq!(config.fast.model, DEFAULT_FAST_MODEL);
        assert_eq!(config.fast.max_tokens, 1024);
        assert_eq!(config.standard.max_tokens, 2048);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MIDWINTER_MODEL", "claude-opus"),
            ("MIDWINTER_TIMEOUT_SECS", " 12 "),
        ]
        .into_iter()
        .collect();
        let config = SearchConfig::default()
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.standard.model, "claude-opus");
        assert_eq!(config.background.model, "claude-opus");
        assert_eq!(config.fast.model, DEFAULT_FAST_MODEL);
        assert_eq!(config.fast.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = SearchConfig::default()
            .apply_overrides(|k| (k == "MIDWINTER_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MIDWINTER_TIMEOUT_SECS"));
    }

    #[test]
    fn test_with_profile() {
        let config = SearchConfig::default().with_profile(
            Profile::Fast,
            ProfileConfig::new("m", 10, 0).with_temperature(0.2),
        );
        assert_eq!(config.fast.round_ceiling, 0);
        assert_eq!(config.fast.temperature, Some(0.2));
    }
}
