//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (`__` separates nested keys, e.g. `APP_SCORING__TOP_N`).
//! `expand_path` expands `~` and `${VAR}` in user-supplied paths.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;
use crate::types::Granularity;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Builds a config from an inline TOML document layered over the defaults.
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(toml));
        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to extract settings: {}", e))
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.validate()?;
        match env {
            "prod" | "production" => {
                if let Some(path) = &settings.text.stopwords_path {
                    if !expand_path(path).exists() {
                        return Err(Error::InvalidConfig(format!("stopwords file {} does not exist", path)).into());
                    }
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Typed view over the merged configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scoring: ScoringConfig,
    pub text: TextConfig,
    pub aggregate: AggregateConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Polarity strictly above this is Positive.
    pub positive_threshold: f64,
    /// Polarity strictly below this is Negative.
    pub negative_threshold: f64,
    pub top_n: usize,
    pub min_token_len: usize,
    pub max_text_chars: usize,
    pub parallel_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            positive_threshold: 0.1,
            negative_threshold: -0.1,
            top_n: 10,
            min_token_len: 2,
            max_text_chars: 100_000,
            parallel_threshold: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Analyzer,
    Whitespace,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub tokenizer: TokenizerKind,
    /// Optional newline-separated list of extra stopwords.
    pub stopwords_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub histogram_buckets: usize,
    pub granularity: Granularity,
    /// Upper bound on gap-filled trend buckets before a coarser granularity is used.
    pub max_trend_buckets: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self { histogram_buckets: 10, granularity: Granularity::Day, max_trend_buckets: 1000 }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        let s = &self.scoring;
        if !(-1.0..=1.0).contains(&s.positive_threshold) || !(-1.0..=1.0).contains(&s.negative_threshold) {
            return Err(Error::InvalidConfig("thresholds must lie within [-1, 1]".into()));
        }
        if s.negative_threshold > s.positive_threshold {
            return Err(Error::InvalidConfig(format!(
                "negative_threshold {} is above positive_threshold {}",
                s.negative_threshold, s.positive_threshold
            )));
        }
        if s.top_n == 0 { return Err(Error::InvalidConfig("scoring.top_n must be at least 1".into())); }
        if s.max_text_chars == 0 { return Err(Error::InvalidConfig("scoring.max_text_chars must be at least 1".into())); }
        if self.aggregate.histogram_buckets == 0 {
            return Err(Error::InvalidConfig("aggregate.histogram_buckets must be at least 1".into()));
        }
        if self.aggregate.max_trend_buckets == 0 {
            return Err(Error::InvalidConfig("aggregate.max_trend_buckets must be at least 1".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.scoring.top_n, 10);
        assert_eq!(settings.aggregate.histogram_buckets, 10);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = Config::from_toml_str(
            r#"
            [scoring]
            top_n = 5
            positive_threshold = 0.2

            [aggregate]
            granularity = "month"
            "#,
        )
        .expect("config");
        let settings = config.settings().expect("settings");
        assert_eq!(settings.scoring.top_n, 5);
        assert_eq!(settings.scoring.positive_threshold, 0.2);
        assert_eq!(settings.scoring.negative_threshold, -0.1);
        assert_eq!(settings.aggregate.granularity, Granularity::Month);
        let top_n: usize = config.get("scoring.top_n").expect("key");
        assert_eq!(top_n, 5);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let err = Config::from_toml_str("[scoring]\npositive_threshold = -0.5\nnegative_threshold = 0.5\n");
        assert!(err.is_err());
    }

    #[test]
    fn zero_buckets_are_rejected() {
        let mut settings = Settings::default();
        settings.aggregate.histogram_buckets = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn env_vars_override_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[scoring]\ntop_n = 4\n")?;
            jail.set_env("APP_SCORING__TOP_N", "7");
            jail.set_env("APP_AGGREGATE__GRANULARITY", "week");
            let settings = Config::load().and_then(|c| c.settings()).map_err(|e| e.to_string())?;
            assert_eq!(settings.scoring.top_n, 7);
            assert_eq!(settings.aggregate.granularity, Granularity::Week);
            Ok(())
        });
    }

    #[test]
    fn env_specific_file_layers_over_base_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[scoring]\ntop_n = 4\nmin_token_len = 3\n")?;
            jail.create_file("config.test.toml", "[scoring]\ntop_n = 6\n")?;
            jail.create_file("config.dev.toml", "[scoring]\ntop_n = 9\n")?;
            jail.set_env("RUST_ENV", "test");
            let config = Config::load().map_err(|e| e.to_string())?;
            let top_n: usize = config.get("scoring.top_n").map_err(|e| e.to_string())?;
            let min_len: usize = config.get("scoring.min_token_len").map_err(|e| e.to_string())?;
            assert_eq!(top_n, 6);
            assert_eq!(min_len, 3);
            Ok(())
        });
    }

    #[test]
    fn prod_requires_existing_stopwords_file() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("RUST_ENV", "prod");
            jail.create_file("config.prod.toml", "[text]\nstopwords_path = \"missing.txt\"\n")?;
            assert!(Config::load().is_err());

            jail.create_file("missing.txt", "product\n")?;
            let settings = Config::load().and_then(|c| c.settings()).map_err(|e| e.to_string())?;
            assert_eq!(settings.text.stopwords_path.as_deref(), Some("missing.txt"));
            Ok(())
        });
    }

    #[test]
    fn invalid_env_override_fails_load() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("APP_AGGREGATE__MAX_TREND_BUCKETS", "0");
            assert!(Config::load().is_err());
            Ok(())
        });
    }
}
