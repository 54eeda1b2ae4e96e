use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{debug, error};

use promptforge::{
  EvalGenerator, EvalRequest, Gateway, GatewayConfig, PromptAnalyzer,
  PromptRunner, Provider,
};

#[derive(Parser)]
#[command(name = "promptforge", version, about = "Prompt critique and execution over hosted LLMs")]
struct Cli
{   /// Override DEFAULT_AI_PROVIDER (openai, azure-openai, anthropic)
    #[arg(long, global = true)]
    provider: Option<String>
  , #[command(subcommand)]
    command: Command
}

#[derive(Subcommand)]
enum Command
{   /// Detailed critique of a prompt
    Analyze
    {   prompt: String
      , #[arg(long, default_value = "")]
        model: String
    }
  , /// Quick and detailed critiques, generated concurrently
    DualAnalyze
    {   prompt: String
      , #[arg(long, default_value = "")]
        model: String
    }
  , /// Run a prompt and print the completion
    Execute
    {   prompt: String
      , #[arg(long, default_value = "")]
        model: String
      , #[arg(long, default_value_t = 0.0)]
        temperature: f32
      , #[arg(long, default_value_t = 0)]
        max_tokens: i64
    }
  , /// Generate an evaluation suite as JSON
    Eval
    {   prompt: String
      , /// Evaluation types, e.g. robustness,safety
        #[arg(long, value_delimiter = ',', required = true)]
        types: Vec<String>
      , #[arg(long, default_value_t = 0)]
        sample_size: usize
      , #[arg(long, default_value = "")]
        model: String
    }
  , /// Show the default provider and which providers have keys
    Providers
}

#[tokio::main]
async fn main() -> ExitCode
{   dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await
    {   Ok(()) => ExitCode::SUCCESS
      , Err(e) => {
          error!("{}", e);
          eprintln!("Error: {}", e);
          ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> promptforge::Result<()>
{   let mut config = GatewayConfig::from_env()?;
    if let Some(tag) = cli.provider.as_deref()
    {   config = config.with_default_provider(tag.parse::<Provider>()?);
    }
    debug!("Default provider: {}", config.default_provider);

    let gateway = Arc::new(Gateway::new(config)?);

    match cli.command
    {   Command::Analyze { prompt, model } => {
          let analyzer = PromptAnalyzer::new(gateway);
          println!("{}", analyzer.analyze(&prompt, &model).await?);
        }
      , Command::DualAnalyze { prompt, model } => {
          let analyzer = PromptAnalyzer::new(gateway);
          let result = analyzer.dual_analyze(&prompt, &model).await?;
          println!("{}", serde_json::to_string_pretty(&result)?);
        }
      , Command::Execute { prompt, model, temperature, max_tokens } => {
          let runner = PromptRunner::new(gateway);
          println!(
            "{}",
            runner.execute(&prompt, &model, temperature, max_tokens).await?
          );
        }
      , Command::Eval { prompt, types, sample_size, model } => {
          let generator = EvalGenerator::new(gateway);
          let suite = generator.generate_suite(EvalRequest
          {   prompt
            , eval_types: types
            , sample_size
            , model
            , difficulty: String::new()
          }).await?;
          println!("{}", serde_json::to_string_pretty(&suite)?);
        }
      , Command::Providers => {
          let status = gateway.provider_status();
          println!("default: {}", status.default);
          for (provider, configured) in status.configured
          {   println!(
                "{:<14} {}",
                provider.as_tag(),
                if configured { "configured" } else { "missing key" }
              );
          }
        }
    }

    Ok(())
}
