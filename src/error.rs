//! Error taxonomy for gateway and analysis operations

use thiserror::Error;

/// Custom error type for PromptForge operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error
{   /// API key is missing for the resolved provider
    #[error("{0} API key not configured")]
    MissingApiKey(String)
  , /// Routing tag does not name a known provider
    #[error("unsupported AI provider: {0}")]
    UnsupportedProvider(String)
  , /// Network or connection failure during the HTTP exchange
    #[error("HTTP error: {0}")]
    Transport(String)
  , /// Provider answered with a non-2xx status
    #[error("{provider} API request failed with status {status}: {body}")]
    ProviderResponse
    {   provider: String
      , status: u16
      , body: String
    }
  , /// 2xx response without any choices or content blocks
    #[error("no response from {provider}")]
    EmptyResponse
    {   provider: String
    }
  , /// Request or response body was not the expected JSON
    #[error("serialization error: {0}")]
    Serialization(String)
  , /// One branch of a dual analysis failed
    #[error("{branch} analysis failed: {source}")]
    Analysis
    {   branch: &'static str
      , source: Box<Error>
    }
  , /// A dual analysis branch stopped without reporting an outcome
    #[error("{0} analysis ended without a result")]
    BranchAborted(&'static str)
  , /// Caller supplied arguments that cannot be acted on
    #[error("invalid request: {0}")]
    InvalidRequest(String)
  , /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String)
}

impl Error
{   /// True for failures detected before any network I/O
    pub fn is_preflight(&self) -> bool
    {   matches!(
          self,
          Error::MissingApiKey(_)
            | Error::UnsupportedProvider(_)
            | Error::InvalidRequest(_)
            | Error::InvalidConfiguration(_)
        )
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
