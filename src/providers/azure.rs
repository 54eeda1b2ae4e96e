use log::{debug, trace};

use crate::config::AzureDeployments;
use crate::error::Result;
use crate::providers::openai::{self, ChatCompletionRequest};
use crate::providers::{exchange, require_api_key, PreparedCall};
use crate::transport::HttpTransport;
use crate::{GenerationRequest, Provider, ProviderConfig};

/// Reasoning model with fixed sampling and a renamed token limit
pub const O3_MODEL: &str = "o3";

/// Build the Azure OpenAI chat completion call.
/// The deployment in the path selects the model, so no `model` field is sent.
pub fn prepare(
  config: &ProviderConfig
, deployments: &AzureDeployments
, request: &GenerationRequest
) -> Result<PreparedCall>
{   let api_key = require_api_key(Provider::AzureOpenAI, config)?;

    let deployment = deployments.deployment_for(&request.model);
    let url = format!(
      "{}/openai/deployments/{}/chat/completions?api-version={}",
      config.trimmed_base_url(),
      deployment,
      config.api_version.as_deref().unwrap_or_default()
    );

    let is_o3 = request.model == O3_MODEL;
    let limit = request.positive_token_limit();

    let body = ChatCompletionRequest
    {   model: None
      , messages: request.messages.clone()
      , temperature: if is_o3 { 1.0 } else { request.temperature }
      , max_tokens: if is_o3 { None } else { limit }
      , max_completion_tokens: if is_o3 { limit } else { None }
    };
    trace!("Azure OpenAI request to {}: {:?}", deployment, body);

    Ok(PreparedCall
    {   url
      , headers: vec![("api-key", api_key)]
      , body: serde_json::to_string(&body)?
    })
}

pub async fn generate(
  transport: &dyn HttpTransport
, config: &ProviderConfig
, deployments: &AzureDeployments
, request: &GenerationRequest
) -> Result<String>
{   debug!("Azure OpenAI generate, model: {:?}", request.model);
    let call = prepare(config, deployments, request)?;
    let body = exchange(transport, Provider::AzureOpenAI, call).await?;
    openai::parse(Provider::AzureOpenAI, &body)
}
