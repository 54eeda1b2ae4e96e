use serde::{Deserialize, Serialize};
use log::{debug, trace};

use crate::error::Result;
use crate::providers::{empty_response, exchange, require_api_key, PreparedCall};
use crate::transport::HttpTransport;
use crate::{GenerationRequest, Message, Provider, ProviderConfig};

pub const DEFAULT_MODEL: &str = "gpt-4";

// ===== Wire Types =====
// Shared with the Azure adapter, which speaks the same protocol.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionRequest
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>
  , pub messages: Vec<Message>
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

// ===== Adapter =====

/// Build the OpenAI chat completion call
pub fn prepare(
  config: &ProviderConfig
, request: &GenerationRequest
) -> Result<PreparedCall>
{   let api_key = require_api_key(Provider::OpenAI, config)?;

    let model = if request.model.is_empty()
    {   DEFAULT_MODEL.to_string()
    } else
    {   request.model.clone()
    };

    let body = ChatCompletionRequest
    {   model: Some(model)
      , messages: request.messages.clone()
      , temperature: request.temperature
      , max_tokens: request.positive_token_limit()
      , max_completion_tokens: None
    };
    trace!("OpenAI request: {:?}", body);

    Ok(PreparedCall
    {   url: format!("{}/chat/completions", config.trimmed_base_url())
      , headers: vec![("Authorization", format!("Bearer {}", api_key))]
      , body: serde_json::to_string(&body)?
    })
}

/// Extract the first choice's content from a chat completion body
pub fn parse(provider: Provider, body: &str) -> Result<String>
{   let response: ChatCompletionResponse = serde_json::from_str(body)?;
    response.choices
      .into_iter()
      .next()
      .map(|c| c.message.content.unwrap_or_default())
      .ok_or_else(|| empty_response(provider))
}

pub async fn generate(
  transport: &dyn HttpTransport
, config: &ProviderConfig
, request: &GenerationRequest
) -> Result<String>
{   debug!("OpenAI generate, model: {:?}", request.model);
    let call = prepare(config, request)?;
    let body = exchange(transport, Provider::OpenAI, call).await?;
    parse(Provider::OpenAI, &body)
}
