use anyhow::{bail, Context, Result};

/// Which backend produces cover-letter text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    Template,
}

impl ProviderKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "template" => Ok(ProviderKind::Template),
            other => bail!("TEXT_PROVIDER must be 'anthropic' or 'template', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    /// Only required when `provider` is `Anthropic`.
    pub anthropic_api_key: Option<String>,
    pub max_concurrent_generations: usize,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = match lookup("TEXT_PROVIDER") {
            Some(v) => ProviderKind::parse(&v)?,
            None => ProviderKind::Anthropic,
        };

        let anthropic_api_key = lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty());
        if provider == ProviderKind::Anthropic && anthropic_api_key.is_none() {
            bail!("Required environment variable 'ANTHROPIC_API_KEY' is not set");
        }

        let max_concurrent_generations = lookup("MAX_CONCURRENT_GENERATIONS")
            .unwrap_or_else(|| "4".to_string())
            .parse::<usize>()
            .context("MAX_CONCURRENT_GENERATIONS must be a positive integer")?;
        if max_concurrent_generations == 0 {
            bail!("MAX_CONCURRENT_GENERATIONS must be at least 1");
        }

        Ok(Config {
            provider,
            anthropic_api_key,
            max_concurrent_generations,
            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
