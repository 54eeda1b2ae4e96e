//! Configuration for PromptForge providers
//!
//! Built once before the gateway is first used and shared read-only
//! through an `Arc`. Nothing in the crate mutates it after construction.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Provider;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";
pub const DEFAULT_AZURE_DEPLOYMENT: &str = "gpt-4.1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Connection settings for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API key; `None` when not configured
    pub api_key: Option<String>
  , /// API base URL
    pub base_url: String
  , /// API version (Azure only)
    pub api_version: Option<String>
}

impl ProviderConfig
{   pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self
    {   ProviderConfig
        {   api_key: non_empty(Some(api_key.into()))
          , base_url: base_url.into()
          , api_version: None
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self
    {   self.api_version = Some(version.into());
        self
    }

    pub fn is_configured(&self) -> bool
    {   self.api_key.is_some()
    }

    /// Base URL without a trailing slash
    pub fn trimmed_base_url(&self) -> &str
    {   self.base_url.trim_end_matches('/')
    }
}

/// Azure model name to deployment name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzureDeployments
{   pub by_model: HashMap<String, String>
  , /// Deployment used for models with no entry
    pub fallback: String
}

impl AzureDeployments
{   pub fn deployment_for(&self, model: &str) -> &str
    {   self.by_model
          .get(model)
          .map(String::as_str)
          .unwrap_or(&self.fallback)
    }
}

impl Default for AzureDeployments
{   fn default() -> Self
    {   let by_model = [("gpt-4.1", "gpt-4.1"), ("o3", "o3")]
          .into_iter()
          .map(|(m, d)| (m.to_string(), d.to_string()))
          .collect();
        AzureDeployments
        {   by_model
          , fallback: DEFAULT_AZURE_DEPLOYMENT.to_string()
        }
    }
}

/// Process-wide gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig
{   pub openai: ProviderConfig
  , pub azure_openai: ProviderConfig
  , pub anthropic: ProviderConfig
  , /// Provider used by default-provider calls
    pub default_provider: Provider
  , pub azure_deployments: AzureDeployments
  , /// Transport-level timeout applied to every provider request
    pub request_timeout_secs: u64
}

impl Default for GatewayConfig
{   fn default() -> Self
    {   GatewayConfig
        {   openai: ProviderConfig
            {   api_key: None
              , base_url: DEFAULT_OPENAI_BASE_URL.to_string()
              , api_version: None
            }
          , azure_openai: ProviderConfig
            {   api_key: None
              , base_url: String::new()
              , api_version: Some(DEFAULT_AZURE_API_VERSION.to_string())
            }
          , anthropic: ProviderConfig
            {   api_key: None
              , base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string()
              , api_version: None
            }
          , default_provider: Provider::Anthropic
          , azure_deployments: AzureDeployments::default()
          , request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS
        }
    }
}

impl GatewayConfig
{   /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| non_empty(lookup(key));
        let defaults = GatewayConfig::default();

        let request_timeout_secs = match get("AI_REQUEST_TIMEOUT_SECS")
        {   Some(raw) => match raw.trim().parse::<u64>()
            {   Ok(secs) if secs > 0 => secs
              , _ => return Err(Error::InvalidConfiguration(format!(
                  "AI_REQUEST_TIMEOUT_SECS must be a positive whole number of seconds, got {:?}",
                  raw
                )))
            }
          , None => defaults.request_timeout_secs
        };

        let config = GatewayConfig
        {   openai: ProviderConfig
            {   api_key: get("OPENAI_API_KEY")
              , base_url: get("OPENAI_BASE_URL")
                  .unwrap_or(defaults.openai.base_url)
              , api_version: None
            }
          , azure_openai: ProviderConfig
            {   api_key: get("AZURE_OPENAI_API_KEY")
              , base_url: get("AZURE_OPENAI_BASE_URL")
                  .unwrap_or(defaults.azure_openai.base_url)
              , api_version: get("AZURE_OPENAI_API_VERSION")
                  .or(defaults.azure_openai.api_version)
            }
          , anthropic: ProviderConfig
            {   api_key: get("ANTHROPIC_API_KEY")
              , base_url: get("ANTHROPIC_BASE_URL")
                  .unwrap_or(defaults.anthropic.base_url)
              , api_version: None
            }
          , default_provider: parse_default_provider(
              get("DEFAULT_AI_PROVIDER").as_deref()
            )
          , azure_deployments: defaults.azure_deployments
          , request_timeout_secs
        };

        debug!(
          "Loaded gateway config, default provider: {}",
          config.default_provider
        );
        Ok(config)
    }

    /// Settings for one provider
    pub fn provider(&self, provider: Provider) -> &ProviderConfig
    {   match provider
        {   Provider::OpenAI => &self.openai
          , Provider::AzureOpenAI => &self.azure_openai
          , Provider::Anthropic => &self.anthropic
        }
    }

    pub fn with_default_provider(mut self, provider: Provider) -> Self
    {   self.default_provider = provider;
        self
    }

    pub fn request_timeout(&self) -> Duration
    {   Duration::from_secs(self.request_timeout_secs)
    }
}

/// Unset selects Anthropic; an unrecognised tag falls back to Azure OpenAI.
fn parse_default_provider(raw: Option<&str>) -> Provider
{   match raw
    {   None => Provider::Anthropic
      , Some(tag) => tag
          .trim()
          .to_ascii_lowercase()
          .parse()
          .unwrap_or(Provider::AzureOpenAI)
    }
}

fn non_empty(value: Option<String>) -> Option<String>
{   value.filter(|v| !v.trim().is_empty())
}
