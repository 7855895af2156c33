use super::date::DateFormat;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Connection settings for the platform API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub tenant_id: String,
    pub auth_token: Option<String>,
    pub date_format: DateFormat,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a dotenv file without touching the process
    /// environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path)
            .with_context(|| format!("could not read {}", path.display()))?
        {
            let (key, value) = item.context("malformed line in env file")?;
            vars.insert(key, value);
        }

        Self::from_lookup(|key| vars.get(key).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = DateFormat::default();

        let base_url = lookup("FINERACT_BASE_URL").context("FINERACT_BASE_URL must be set")?;
        if base_url.trim().is_empty() {
            anyhow::bail!("FINERACT_BASE_URL must not be empty");
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            tenant_id: lookup("FINERACT_TENANT_ID").unwrap_or_else(|| "default".to_owned()),
            auth_token: lookup("FINERACT_AUTH_TOKEN").filter(|t| !t.is_empty()),
            date_format: DateFormat::new(
                lookup("FINERACT_DATE_FORMAT").unwrap_or(defaults.pattern),
                lookup("FINERACT_LOCALE").unwrap_or(defaults.locale),
            ),
        })
    }

    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}
