//! Unified request and response types for PromptForge

use serde::{Deserialize, Serialize};

/// Author of a message in a conversation turn history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

/// One entry of an ordered conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message
{   pub role: Role
  , pub content: String
}

impl Message
{   pub fn system(content: impl Into<String>) -> Self
    {   Message { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   Message { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   Message { role: Role::Assistant, content: content.into() }
    }
}

/// Provider-agnostic generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// Ordered conversation, system turns included
    pub messages: Vec<Message>
  , /// Sampling temperature, OpenAI convention [0, 2]
    pub temperature: f32
  , /// Token limit; `None` or a non-positive value means unset
    pub max_output_tokens: Option<i64>
  , /// Model identifier; empty selects the provider default
    pub model: String
  , /// Provider to route to
    pub provider: crate::Provider
}

impl GenerationRequest
{   /// Token limit when the caller supplied a positive one
    pub fn positive_token_limit(&self) -> Option<u32>
    {   self.max_output_tokens
          .filter(|n| *n > 0)
          .map(|n| n.min(u32::MAX as i64) as u32)
    }
}

/// Generated text of a successful call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult
{   pub text: String
}

/// Both critique reports, only ever built when both succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualAnalysisResult
{   pub quick_report: String
  , pub detailed_report: String
}
