//! Provider routing
//!
//! The [`Gateway`] owns the immutable [`GatewayConfig`] and an
//! [`HttpTransport`], and dispatches each request to exactly one
//! adapter by matching on [`Provider`]. Unknown tags and missing keys
//! are rejected before the transport is touched.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::providers::{anthropic, azure, openai};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{GatewayConfig, GenerationRequest, GenerationResult, Message, Provider};

/// Default-provider text generation, the contract consumed by the
/// analysis, runner and eval layers.
#[async_trait]
pub trait ChatGenerator: Send + Sync
{   async fn generate_text(
      &self
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>;
}

/// Which providers exist and which have credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus
{   pub default: Provider
  , pub available: Vec<Provider>
  , pub configured: Vec<(Provider, bool)>
}

#[derive(Clone)]
pub struct Gateway
{   config: Arc<GatewayConfig>
  , transport: Arc<dyn HttpTransport>
}

impl Gateway
{   /// Gateway over a `reqwest` transport using the configured timeout
    pub fn new(config: GatewayConfig) -> Result<Self>
    {   let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(
      config: GatewayConfig
    , transport: Arc<dyn HttpTransport>
    ) -> Self
    {   debug!(
          "Creating Gateway, default provider: {}",
          config.default_provider
        );
        Gateway
        {   config: Arc::new(config)
          , transport
        }
    }

    pub fn config(&self) -> &GatewayConfig
    {   &self.config
    }

    /// Route one request to its provider's adapter
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> Result<GenerationResult>
    {   let provider = request.provider;
        let settings = self.config.provider(provider);
        let transport = self.transport.as_ref();
        debug!(
          "Routing {} message(s) to {}",
          request.messages.len(),
          provider
        );

        let text = match provider
        {   Provider::OpenAI => {
              openai::generate(transport, settings, request).await?
            }
          , Provider::AzureOpenAI => {
              azure::generate(
                transport,
                settings,
                &self.config.azure_deployments,
                request
              ).await?
            }
          , Provider::Anthropic => {
              anthropic::generate(transport, settings, request).await?
            }
        };

        Ok(GenerationResult { text })
    }

    /// Explicit-provider call; `provider_tag` is parsed before any I/O
    pub async fn call(
      &self
    , provider_tag: &str
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>
    {   let provider: Provider = provider_tag.parse()?;
        self.call_provider(provider, messages, temperature, max_tokens, model)
          .await
    }

    pub async fn call_provider(
      &self
    , provider: Provider
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>
    {   let request = GenerationRequest
        {   messages
          , temperature
          , max_output_tokens: Some(max_tokens)
          , model: model.to_string()
          , provider
        };
        Ok(self.generate(&request).await?.text)
    }

    /// Call through the configured default provider
    pub async fn call_with_default_provider(
      &self
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>
    {   self.call_provider(
          self.config.default_provider,
          messages,
          temperature,
          max_tokens,
          model
        ).await
    }

    pub fn provider_status(&self) -> ProviderStatus
    {   ProviderStatus
        {   default: self.config.default_provider
          , available: Provider::ALL.to_vec()
          , configured: Provider::ALL
              .iter()
              .map(|p| (*p, self.config.provider(*p).is_configured()))
              .collect()
        }
    }
}

#[async_trait]
impl ChatGenerator for Gateway
{   async fn generate_text(
      &self
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>
    {   self.call_with_default_provider(messages, temperature, max_tokens, model)
          .await
    }
}
