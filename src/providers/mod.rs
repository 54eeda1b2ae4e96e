//! LLM provider protocol adapters
//!
//! Each adapter splits its work into a pure `prepare` step (URL,
//! headers, JSON body), the shared [`exchange`] over an
//! [`HttpTransport`], and a pure `parse` step that pulls the text out of
//! the provider's response shape.

pub mod openai;
pub mod azure;
pub mod anthropic;

use log::debug;

use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use crate::Provider;

/// Fully built wire request, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall
{   pub url: String
  , pub headers: Vec<(&'static str, String)>
  , pub body: String
}

impl PreparedCall
{   /// Value of a header by exact name
    pub fn header(&self, name: &str) -> Option<&str>
    {   self.headers
          .iter()
          .find(|(n, _)| *n == name)
          .map(|(_, v)| v.as_str())
    }

    /// Body decoded back into JSON, for inspection
    pub fn body_json(&self) -> Result<serde_json::Value>
    {   Ok(serde_json::from_str(&self.body)?)
    }
}

/// Send a prepared call and return the body of a 2xx response.
/// Any other status becomes [`Error::ProviderResponse`] with the raw body.
pub async fn exchange(
  transport: &dyn HttpTransport
, provider: Provider
, call: PreparedCall
) -> Result<String>
{   debug!("Dispatching {} request to {}", provider.display_name(), call.url);

    let reply = transport
      .post_json(&call.url, &call.headers, call.body)
      .await?;

    if !reply.is_success()
    {   debug!(
          "{} answered with status {}",
          provider.display_name(),
          reply.status
        );
        return Err(Error::ProviderResponse
        {   provider: provider.display_name().to_string()
          , status: reply.status
          , body: reply.body
        });
    }

    Ok(reply.body)
}

/// API key of a provider, or the pre-flight configuration error
pub(crate) fn require_api_key(
  provider: Provider
, config: &crate::ProviderConfig
) -> Result<String>
{   config.api_key
      .clone()
      .ok_or_else(|| Error::MissingApiKey(
        provider.display_name().to_string()
      ))
}

pub(crate) fn empty_response(provider: Provider) -> Error
{   Error::EmptyResponse
    {   provider: provider.display_name().to_string()
    }
}
