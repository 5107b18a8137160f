use anyhow::{anyhow, Result};
use url::Url;

pub const DEFAULT_BASE: &str = "https://api.tradier.com/v1";

/// Where requests go and which account they act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub account_id: String,
}

impl Config {
    pub fn new(base_url: &str, account_id: impl Into<String>) -> Result<Self> {
        let account_id = account_id.into();
        if account_id.trim().is_empty() {
            return Err(anyhow!("account id must not be empty"));
        }
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| anyhow!("invalid base url {base_url:?}: {e}"))?;
        Ok(Self { base_url, account_id })
    }

    /// `TRADIER_BASE` (optional) and `TRADIER_ACCOUNT_ID` (required).
    pub fn from_env() -> Result<Self> {
        let base = std::env::var("TRADIER_BASE").unwrap_or_else(|_| DEFAULT_BASE.to_string());
        let account_id = std::env::var("TRADIER_ACCOUNT_ID")
            .map_err(|_| anyhow!("TRADIER_ACCOUNT_ID is not set"))?;
        Self::new(&base, account_id)
    }

    /// Join path segments onto the base url.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("base url {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
