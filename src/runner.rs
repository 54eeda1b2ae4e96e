//! Plain prompt execution paths: execute, prompt-engineer, multi-model

use std::sync::Arc;
use std::time::Instant;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gateway::ChatGenerator;
use crate::Message;

pub const DEFAULT_EXECUTE_MODEL: &str = "gpt-4.1";
pub const DEFAULT_ENGINEER_MODEL: &str = "o3";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const ENGINEER_MAX_TOKENS: i64 = 2000;
pub const MULTI_MODEL_MAX_TOKENS: i64 = 1000;

/// Outcome of one model in a multi-model run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelExecutionResult
{   pub model: String
  , pub success: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , /// Wall-clock time of the call in milliseconds
    pub execution_time_ms: u64
}

#[derive(Clone)]
pub struct PromptRunner
{   generator: Arc<dyn ChatGenerator>
}

fn or_default_temperature(temperature: f32) -> f32
{   if temperature == 0.0 { DEFAULT_TEMPERATURE } else { temperature }
}

fn or_default_model<'a>(model: &'a str, fallback: &'a str) -> &'a str
{   if model.is_empty() { fallback } else { model }
}

impl PromptRunner
{   pub fn new(generator: Arc<dyn ChatGenerator>) -> Self
    {   PromptRunner { generator }
    }

    /// Run a single user prompt
    pub async fn execute(
      &self
    , prompt: &str
    , model: &str
    , temperature: f32
    , max_tokens: i64
    ) -> Result<String>
    {   let model = or_default_model(model, DEFAULT_EXECUTE_MODEL);
        debug!("Executing prompt with model: {}", model);
        self.generator
          .generate_text(
            vec![Message::user(prompt)],
            or_default_temperature(temperature),
            max_tokens,
            model
          )
          .await
    }

    /// Continue a prompt-engineering conversation
    pub async fn prompt_engineer(
      &self
    , messages: Vec<Message>
    , model: &str
    , temperature: f32
    ) -> Result<String>
    {   let model = or_default_model(model, DEFAULT_ENGINEER_MODEL);
        debug!(
          "Prompt engineering with model: {}, {} message(s)",
          model,
          messages.len()
        );
        self.generator
          .generate_text(
            messages,
            or_default_temperature(temperature),
            ENGINEER_MAX_TOKENS,
            model
          )
          .await
    }

    /// Run the same prompt against each model in turn.
    /// Individual failures are recorded, not propagated.
    pub async fn multi_model_execute(
      &self
    , prompt: &str
    , models: &[String]
    , temperature: f32
    , max_tokens: i64
    ) -> Result<Vec<ModelExecutionResult>>
    {   if models.is_empty()
        {   return Err(Error::InvalidRequest(
              "at least one model must be specified".to_string()
            ));
        }

        let temperature = or_default_temperature(temperature);
        let max_tokens = if max_tokens == 0
        {   MULTI_MODEL_MAX_TOKENS
        } else
        {   max_tokens
        };

        let mut results = Vec::with_capacity(models.len());
        for model in models
        {   let started = Instant::now();
            let outcome = self.generator
              .generate_text(
                vec![Message::user(prompt)],
                temperature,
                max_tokens,
                model
              )
              .await;
            let execution_time_ms = started.elapsed().as_millis() as u64;
            debug!("Model {} finished in {} ms", model, execution_time_ms);

            results.push(match outcome
            {   Ok(text) => ModelExecutionResult
                {   model: model.clone()
                  , success: true
                  , response: Some(text)
                  , error: None
                  , execution_time_ms
                }
              , Err(e) => ModelExecutionResult
                {   model: model.clone()
                  , success: false
                  , response: None
                  , error: Some(e.to_string())
                  , execution_time_ms
                }
            });
        }

        Ok(results)
    }
}
