pub mod error;
pub mod config;
pub mod transport;
pub mod providers;
pub mod request;
pub mod gateway;
pub mod analysis;
pub mod runner;
pub mod eval;

use serde::{Deserialize, Serialize};

/*

promptforge: one "produce a chat completion" call, satisfied by any
of several hosted LLM providers, plus a prompt critique workflow
that fans two generations out concurrently and joins them.

promptforge/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Provider tags and re-exports
│   ├── error.rs        # Error taxonomy
│   ├── config.rs       # Immutable provider configuration
│   ├── transport.rs    # HTTP seam (reqwest-backed)
│   ├── providers/      # Per-provider wire protocols
│   │   ├── mod.rs
│   │   ├── openai.rs   # OpenAI chat completions, shared wire types
│   │   ├── azure.rs    # Azure OpenAI deployments and o3 quirks
│   │   └── anthropic.rs
│   ├── request.rs      # Provider-agnostic messages and results
│   ├── gateway.rs      # Provider routing
│   ├── analysis.rs     # Quick / detailed critique, dual join
│   ├── runner.rs       # Execute, prompt-engineer, multi-model
│   ├── eval.rs         # Evaluation suite generator
│   └── main.rs         # CLI
└── tests/

*/

pub use error::{Error, Result};
pub use config::{GatewayConfig, ProviderConfig};
pub use request::{
  DualAnalysisResult, GenerationRequest, GenerationResult, Message, Role,
};
pub use gateway::{ChatGenerator, Gateway, ProviderStatus};
pub use analysis::{PromptAnalyzer, PromptMetrics};
pub use runner::{ModelExecutionResult, PromptRunner};
pub use eval::{EvalGenerator, EvalRequest, EvalSuite};

/// Closed set of supported LLM providers.
/// Each variant corresponds to one wire protocol adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{
  /// OpenAI (and any OpenAI-compatible endpoint)
  #[serde(rename = "openai")]
  OpenAI
  ,
  /// OpenAI models hosted on Azure deployments
  #[serde(rename = "azure-openai")]
  AzureOpenAI
  ,
  /// Anthropic (Claude models)
  #[serde(rename = "anthropic")]
  Anthropic
}

impl Provider
{   /// Every provider the gateway can route to
    pub const ALL: [Provider; 3] = [
      Provider::OpenAI
    , Provider::AzureOpenAI
    , Provider::Anthropic
    ];

    /// Routing tag as used in configuration
    pub fn as_tag(&self) -> &'static str
    {   match self
        {   Provider::OpenAI => "openai"
          , Provider::AzureOpenAI => "azure-openai"
          , Provider::Anthropic => "anthropic"
        }
    }

    /// Human-readable name used in error messages
    pub fn display_name(&self) -> &'static str
    {   match self
        {   Provider::OpenAI => "OpenAI"
          , Provider::AzureOpenAI => "Azure OpenAI"
          , Provider::Anthropic => "Anthropic"
        }
    }
}

impl std::fmt::Display for Provider
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_tag())
    }
}

impl std::str::FromStr for Provider
{   type Err = Error;

    fn from_str(tag: &str) -> Result<Self>
    {   Provider::ALL
          .into_iter()
          .find(|p| p.as_tag() == tag)
          .ok_or_else(|| Error::UnsupportedProvider(tag.to_string()))
    }
}
