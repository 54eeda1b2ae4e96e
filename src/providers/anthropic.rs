use serde::{Deserialize, Serialize};
use log::{debug, trace};

use crate::error::Result;
use crate::providers::{empty_response, exchange, require_api_key, PreparedCall};
use crate::transport::HttpTransport;
use crate::{GenerationRequest, Message, Provider, ProviderConfig, Role};

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const API_VERSION: &str = "2023-06-01";
/// Messages API rejects requests without a token limit
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessagesRequest
{   pub model: String
  , pub max_tokens: u32
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>
  , pub messages: Vec<Message>
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse
{   #[serde(default)]
    pub content: Vec<ContentBlock>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock
{   #[serde(default)]
    pub text: String
}

// ===== Conversions =====

/// Map an OpenAI-range temperature [0, 2] onto Anthropic's [0, 1].
/// Values above 1 are halved, then everything is clamped.
pub fn convert_temperature(temperature: f32) -> f32
{   if temperature.is_nan()
    {   return 0.0;
    }
    let scaled = if temperature > 1.0
    {   temperature / 2.0
    } else
    {   temperature
    };
    scaled.clamp(0.0, 1.0)
}

/// Pull system turns out of the list.
/// Only the last system message survives; earlier ones are dropped.
pub fn split_system(messages: &[Message]) -> (Option<String>, Vec<Message>)
{   let mut system = None;
    let mut turns = Vec::with_capacity(messages.len());
    for message in messages
    {   match message.role
        {   Role::System => system = Some(message.content.clone())
          , _ => turns.push(message.clone())
        }
    }
    (system.filter(|s: &String| !s.is_empty()), turns)
}

// ===== Adapter =====

pub fn prepare(
  config: &ProviderConfig
, request: &GenerationRequest
) -> Result<PreparedCall>
{   let api_key = require_api_key(Provider::Anthropic, config)?;

    let model = if request.model.is_empty()
    {   DEFAULT_MODEL.to_string()
    } else
    {   request.model.clone()
    };
    let (system, messages) = split_system(&request.messages);

    let body = MessagesRequest
    {   model
      , max_tokens: request
          .positive_token_limit()
          .unwrap_or(DEFAULT_MAX_TOKENS)
      , temperature: convert_temperature(request.temperature)
      , system
      , messages
    };
    trace!("Anthropic request: {:?}", body);

    Ok(PreparedCall
    {   url: format!("{}/v1/messages", config.trimmed_base_url())
      , headers: vec![
          ("x-api-key", api_key)
        , ("anthropic-version", API_VERSION.to_string())
        ]
      , body: serde_json::to_string(&body)?
    })
}

/// Extract the first content block's text
pub fn parse(body: &str) -> Result<String>
{   let response: MessagesResponse = serde_json::from_str(body)?;
    response.content
      .into_iter()
      .next()
      .map(|block| block.text)
      .ok_or_else(|| empty_response(Provider::Anthropic))
}

pub async fn generate(
  transport: &dyn HttpTransport
, config: &ProviderConfig
, request: &GenerationRequest
) -> Result<String>
{   debug!("Anthropic generate, model: {:?}", request.model);
    let call = prepare(config, request)?;
    let body = exchange(transport, Provider::Anthropic, call).await?;
    parse(&body)
}
