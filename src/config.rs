//! Service and deck configuration.
//!
//! [`ServiceConfig`] describes the external generation services and is read
//! from the environment (and an optional `.env` file). [`DeckOptions`]
//! describes the shape of one deck and is set by the caller.

use crate::error::{Error, Result};
use crate::generate::RetryPolicy;
use crate::model::{ChartContent, DeckPlan};
use std::path::PathBuf;
use std::time::Duration;

/// Default text model identifier.
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Default system prompt sent with every text request.
pub const DEFAULT_PERSONA: &str = "You are a conspiracy scientist creating a presentation";

/// Maximum bullets laid out per column.
pub const COLUMN_CAPACITY: usize = 5;

/// How bullet slides arrange their bullets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Left column gets the first `ceil(n/2)` bullets, right column the rest
    #[default]
    TwoColumn,
    /// All bullets in one full-width column
    SingleColumn,
}

impl ColumnPolicy {
    /// Total bullets the policy can lay out.
    pub fn capacity(&self) -> usize {
        match self {
            ColumnPolicy::TwoColumn => 2 * COLUMN_CAPACITY,
            ColumnPolicy::SingleColumn => COLUMN_CAPACITY,
        }
    }
}

/// Where chart slides get their data from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChartSource {
    /// Ask the text service for a categories line and a values line
    #[default]
    Generated,
    /// Use fixed data; no generation call is made for chart slides
    Fixed(ChartContent),
}

impl ChartSource {
    /// Sample data used when charts are not generated.
    pub fn sample() -> Self {
        ChartSource::Fixed(ChartContent::new(
            vec![
                "Sightings".to_string(),
                "Documents".to_string(),
                "Witnesses".to_string(),
                "Cover-ups".to_string(),
            ],
            vec![42.0, 17.0, 8.0, 23.0],
        ))
    }
}

/// Options that shape a single deck.
#[derive(Debug, Clone)]
pub struct DeckOptions {
    /// Ordered slide types of the deck
    pub plan: DeckPlan,

    /// Number of bullets generated per Bullets slide
    pub bullet_count: usize,

    /// Bullet column arrangement
    pub column_policy: ColumnPolicy,

    /// Source of chart data
    pub chart_source: ChartSource,

    /// System prompt sent with every text request
    pub persona: String,

    /// Request pictures for Image slides
    pub images: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            plan: DeckPlan::default(),
            bullet_count: 2,
            column_policy: ColumnPolicy::TwoColumn,
            chart_source: ChartSource::Generated,
            persona: DEFAULT_PERSONA.to_string(),
            images: true,
        }
    }
}

impl DeckOptions {
    /// Create default deck options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deck plan.
    pub fn with_plan(mut self, plan: DeckPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Set the number of bullets per Bullets slide.
    pub fn with_bullet_count(mut self, count: usize) -> Self {
        self.bullet_count = count;
        self
    }

    /// Set the bullet column policy.
    pub fn with_column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = policy;
        self
    }

    /// Set the chart data source.
    pub fn with_chart_source(mut self, source: ChartSource) -> Self {
        self.chart_source = source;
        self
    }

    /// Set the system prompt.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Enable or disable picture generation.
    pub fn with_images(mut self, enabled: bool) -> Self {
        self.images = enabled;
        self
    }

    /// Check the options before any generation call is made.
    pub fn validate(&self) -> Result<()> {
        if self.bullet_count == 0 {
            return Err(Error::config("bullet count must be at least 1"));
        }
        if self.bullet_count > self.column_policy.capacity() {
            return Err(Error::config(format!(
                "bullet count {} exceeds the column capacity of {}",
                self.bullet_count,
                self.column_policy.capacity()
            )));
        }
        if self.persona.trim().is_empty() {
            return Err(Error::config("persona must not be empty"));
        }
        if let ChartSource::Fixed(ref chart) = self.chart_source {
            if chart.is_empty()
                || !chart.same_length
                || chart.categories.len() != chart.values.len()
            {
                return Err(Error::config(
                    "fixed chart data needs one value per category",
                ));
            }
        }
        Ok(())
    }
}

/// Connection settings for the generation services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Text model identifier
    pub model: String,

    /// Maximum tokens per text response
    pub max_tokens: u32,

    /// Per-call timeout
    pub timeout: Duration,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// OpenAI API key; enables image generation when set
    pub openai_api_key: Option<String>,

    /// Image model identifier
    pub image_model: String,

    /// Image size, e.g. `1024x1024`
    pub image_size: String,

    /// Where the generated deck is written
    pub output: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
            max_retries: 1,
            openai_api_key: None,
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            output: PathBuf::from("generated_presentation.pptx"),
        }
    }
}

impl ServiceConfig {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through a lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.anthropic_api_key = get("ANTHROPIC_API_KEY");
        config.openai_api_key = get("OPENAI_API_KEY");

        if let Some(model) = get("SLIDEGEN_MODEL") {
            config.model = model;
        }
        if let Some(value) = get("SLIDEGEN_MAX_TOKENS") {
            config.max_tokens = parse_number("SLIDEGEN_MAX_TOKENS", &value)?;
        }
        if let Some(value) = get("SLIDEGEN_TIMEOUT_SECS") {
            let secs: u64 = parse_number("SLIDEGEN_TIMEOUT_SECS", &value)?;
            if secs == 0 {
                return Err(Error::config("SLIDEGEN_TIMEOUT_SECS must be positive"));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = get("SLIDEGEN_MAX_RETRIES") {
            config.max_retries = parse_number("SLIDEGEN_MAX_RETRIES", &value)?;
        }
        if let Some(model) = get("SLIDEGEN_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(size) = get("SLIDEGEN_IMAGE_SIZE") {
            config.image_size = size;
        }
        if let Some(output) = get("SLIDEGEN_OUTPUT") {
            config.output = PathBuf::from(output);
        }

        Ok(config)
    }

    /// Set the text model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Retry policy derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_timeout(self.timeout)
    }

    /// The Anthropic key, or a configuration error naming the variable.
    pub fn require_anthropic_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .ok_or_else(|| Error::config("ANTHROPIC_API_KEY is not set"))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_deck_options() {
        let opts = DeckOptions::default();
        assert_eq!(opts.bullet_count, 2);
        assert_eq!(opts.column_policy, ColumnPolicy::TwoColumn);
        assert_eq!(opts.chart_source, ChartSource::Generated);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let opts = DeckOptions::new()
            .with_bullet_count(4)
            .with_column_policy(ColumnPolicy::SingleColumn)
            .with_chart_source(ChartSource::sample())
            .with_images(false);

        assert_eq!(opts.bullet_count, 4);
        assert_eq!(opts.column_policy, ColumnPolicy::SingleColumn);
        assert!(matches!(opts.chart_source, ChartSource::Fixed(_)));
        assert!(!opts.images);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bullet_counts() {
        assert!(DeckOptions::new().with_bullet_count(0).validate().is_err());
        assert!(DeckOptions::new().with_bullet_count(10).validate().is_ok());
        assert!(DeckOptions::new().with_bullet_count(11).validate().is_err());
        assert!(DeckOptions::new()
            .with_bullet_count(6)
            .with_column_policy(ColumnPolicy::SingleColumn)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_bad_fixed_chart() {
        let empty = DeckOptions::new().with_chart_source(ChartSource::Fixed(ChartContent::no_data()));
        assert!(empty.validate().is_err());

        let zero_filled = DeckOptions::new().with_chart_source(ChartSource::Fixed(
            ChartContent::zero_filled(vec!["A".to_string()]),
        ));
        assert!(zero_filled.validate().is_err());

        let mismatched = DeckOptions::new().with_chart_source(ChartSource::Fixed(ChartContent {
            categories: vec!["A".to_string(), "B".to_string()],
            values: vec![1.0],
            same_length: true,
        }));
        assert!(mismatched.validate().is_err());
    }

    #[test]
    fn test_service_config_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 1);
        assert!(config.anthropic_api_key.is_none());
        assert!(config.require_anthropic_key().is_err());
    }

    #[test]
    fn test_service_config_from_lookup() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("SLIDEGEN_MODEL", "claude-test"),
            ("SLIDEGEN_TIMEOUT_SECS", "5"),
            ("SLIDEGEN_MAX_RETRIES", "3"),
            ("OPENAI_API_KEY", "  "),
            ("SLIDEGEN_OUTPUT", "out/deck.pptx"),
        ]))
        .unwrap();

        assert_eq!(config.require_anthropic_key().unwrap(), "sk-test");
        assert_eq!(config.model, "claude-test");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 3);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.output, PathBuf::from("out/deck.pptx"));
        assert_eq!(config.retry_policy().max_retries, 3);
    }

    #[test]
    fn test_service_config_rejects_malformed_numbers() {
        let err = ServiceConfig::from_lookup(lookup(&[("SLIDEGEN_MAX_TOKENS", "lots")])).unwrap_err();
        assert!(err.is_fatal());
        assert!(ServiceConfig::from_lookup(lookup(&[("SLIDEGEN_TIMEOUT_SECS", "0")])).is_err());
    }
}
