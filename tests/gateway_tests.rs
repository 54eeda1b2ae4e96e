use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use promptforge::transport::{HttpReply, HttpTransport};
use promptforge::{
  Error, Gateway, GatewayConfig, GenerationRequest, Message, PromptAnalyzer,
  Provider, ProviderConfig, Result,
};
use serde_json::Value;
use tokio_test::{assert_err, assert_ok};

/// One captured outgoing request
#[derive(Debug, Clone)]
struct Captured
{   url: String
  , headers: Vec<(&'static str, String)>
  , body: Value
}

/// Answers every request with a fixed reply and keeps what was sent
struct CapturingTransport
{   reply: HttpReply
  , calls: AtomicUsize
  , captured: Mutex<Vec<Captured>>
}

impl CapturingTransport
{   fn new(status: u16, body: &str) -> Arc<Self>
    {   Arc::new(CapturingTransport
        {   reply: HttpReply { status, body: body.to_string() }
          , calls: AtomicUsize::new(0)
          , captured: Mutex::new(Vec::new())
        })
    }

    fn last(&self) -> Captured
    {   self.captured.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpTransport for CapturingTransport
{   async fn post_json(
      &self
    , url: &str
    , headers: &[(&'static str, String)]
    , body: String
    ) -> Result<HttpReply>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured.lock().unwrap().push(Captured
        {   url: url.to_string()
          , headers: headers.to_vec()
          , body: serde_json::from_str(&body).unwrap()
        });
        Ok(self.reply.clone())
    }
}

/// Fails every request at the transport level
struct FailingTransport
{   calls: AtomicUsize
}

#[async_trait]
impl HttpTransport for FailingTransport
{   async fn post_json(
      &self
    , _url: &str
    , _headers: &[(&'static str, String)]
    , _body: String
    ) -> Result<HttpReply>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Transport("connection refused".to_string()))
    }
}

fn config(default: Provider) -> GatewayConfig
{   GatewayConfig
    {   openai: ProviderConfig::new("sk-openai", "https://api.openai.com/v1")
      , azure_openai: ProviderConfig::new("az-key", "https://res.openai.azure.com/")
          .with_api_version("2024-02-15-preview")
      , anthropic: ProviderConfig::new("sk-ant", "https://api.anthropic.com/")
      , default_provider: default
      , ..GatewayConfig::default()
    }
}

fn header<'a>(captured: &'a Captured, name: &str) -> Option<&'a str>
{   captured.headers
      .iter()
      .find(|(n, _)| *n == name)
      .map(|(_, v)| v.as_str())
}

const OPENAI_REPLY: &str =
  r#"{"choices":[{"message":{"role":"assistant","content":"from openai"}}]}"#;
const ANTHROPIC_REPLY: &str =
  r#"{"content":[{"type":"text","text":"from claude"}]}"#;

fn conversation() -> Vec<Message>
{   vec![
      Message::system("You are terse")
    , Message::user("Hello")
    , Message::assistant("Hi")
    , Message::user("Bye")
    ]
}

#[tokio::test]
async fn anthropic_request_lifts_system_and_rescales()
{   let transport = CapturingTransport::new(200, ANTHROPIC_REPLY);
    let gateway = Gateway::with_transport(config(Provider::Anthropic), transport.clone());

    let result = gateway.generate(&GenerationRequest
    {   messages: conversation()
      , temperature: 2.0
      , max_output_tokens: None
      , model: "claude-3-haiku".to_string()
      , provider: Provider::Anthropic
    }).await;
    assert_eq!(assert_ok!(result).text, "from claude");

    let sent = transport.last();
    assert_eq!(sent.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(header(&sent, "x-api-key"), Some("sk-ant"));
    assert_eq!(header(&sent, "anthropic-version"), Some("2023-06-01"));
    assert_eq!(sent.body["model"], "claude-3-haiku");
    assert_eq!(sent.body["system"], "You are terse");
    assert_eq!(sent.body["temperature"].as_f64(), Some(1.0));
    assert_eq!(sent.body["max_tokens"], 1000);
    let roles: Vec<&str> = sent.body["messages"]
      .as_array()
      .unwrap()
      .iter()
      .map(|m| m["role"].as_str().unwrap())
      .collect();
    assert_eq!(roles, vec!["user", "assistant", "user"]);
}

#[tokio::test]
async fn openai_request_keeps_system_inline()
{   let transport = CapturingTransport::new(200, OPENAI_REPLY);
    let gateway = Gateway::with_transport(config(Provider::OpenAI), transport.clone());

    let text = gateway
      .call_with_default_provider(conversation(), 1.8, 300, "")
      .await;
    assert_eq!(assert_ok!(text), "from openai");

    let sent = transport.last();
    assert_eq!(sent.url, "https://api.openai.com/v1/chat/completions");
    assert_eq!(header(&sent, "Authorization"), Some("Bearer sk-openai"));
    assert_eq!(sent.body["model"], "gpt-4");
    assert_eq!(sent.body["messages"].as_array().unwrap().len(), 4);
    assert_eq!(sent.body["messages"][0]["role"], "system");
    assert_eq!(sent.body["max_tokens"], 300);
    let temperature = sent.body["temperature"].as_f64().unwrap();
    assert!((temperature - 1.8).abs() < 1e-6);
}

#[tokio::test]
async fn azure_o3_request_uses_alternate_limit()
{   let transport = CapturingTransport::new(200, OPENAI_REPLY);
    let gateway = Gateway::with_transport(config(Provider::AzureOpenAI), transport.clone());

    assert_ok!(
      gateway.call_with_default_provider(conversation(), 0.3, 2000, "o3").await
    );

    let sent = transport.last();
    assert_eq!(
      sent.url,
      "https://res.openai.azure.com/openai/deployments/o3/chat/completions?api-version=2024-02-15-preview"
    );
    assert_eq!(header(&sent, "api-key"), Some("az-key"));
    assert_eq!(sent.body["temperature"].as_f64(), Some(1.0));
    assert_eq!(sent.body["max_completion_tokens"], 2000);
    assert!(sent.body.get("max_tokens").is_none());
}

#[tokio::test]
async fn unsupported_provider_makes_no_network_call()
{   let transport = CapturingTransport::new(200, OPENAI_REPLY);
    let gateway = Gateway::with_transport(config(Provider::OpenAI), transport.clone());

    let err = assert_err!(
      gateway.call("mistral", vec![Message::user("hi")], 0.7, 0, "").await
    );
    assert_eq!(err, Error::UnsupportedProvider("mistral".to_string()));
    assert!(err.is_preflight());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn dual_analysis_through_gateway_issues_two_calls()
{   let transport = CapturingTransport::new(200, ANTHROPIC_REPLY);
    let gateway = Arc::new(Gateway::with_transport(
      config(Provider::Anthropic),
      transport.clone()
    ));
    let analyzer = PromptAnalyzer::new(gateway);

    let result = assert_ok!(analyzer.dual_analyze("Hello world", "").await);
    assert_eq!(result.quick_report, "from claude");
    assert_eq!(result.detailed_report, "from claude");
    assert_eq!(transport.calls.load(Ordering::SeqCst), 2);

    let captured = transport.captured.lock().unwrap().clone();
    let mut limits: Vec<u64> = captured
      .iter()
      .map(|c| c.body["max_tokens"].as_u64().unwrap())
      .collect();
    limits.sort();
    assert_eq!(limits, vec![500, 2000]);
    assert!(captured.iter().all(|c| c.body["model"] == "gpt-4.1"));
}

#[tokio::test]
async fn provider_error_surfaces_from_dual_analysis()
{   let transport = CapturingTransport::new(503, "overloaded");
    let gateway = Arc::new(Gateway::with_transport(
      config(Provider::OpenAI),
      transport
    ));

    let err = assert_err!(
      PromptAnalyzer::new(gateway).dual_analyze("Hello world", "").await
    );
    match err
    {   Error::Analysis { source, .. } => {
          assert_eq!(*source, Error::ProviderResponse
          {   provider: "OpenAI".to_string()
            , status: 503
            , body: "overloaded".to_string()
          });
        }
      , other => panic!("unexpected error: {:?}", other)
    }
}

#[tokio::test]
async fn transport_error_passes_through_unchanged()
{   let refused = Error::Transport("connection refused".to_string());

    for provider in Provider::ALL
    {   let transport = Arc::new(FailingTransport { calls: AtomicUsize::new(0) });
        let gateway = Gateway::with_transport(config(provider), transport.clone());

        let err = assert_err!(
          gateway.call_with_default_provider(conversation(), 0.7, 100, "").await
        );
        assert_eq!(err, refused, "{}", provider);
        assert!(!err.is_preflight());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn transport_error_surfaces_from_dual_analysis()
{   let transport = Arc::new(FailingTransport { calls: AtomicUsize::new(0) });
    let gateway = Arc::new(Gateway::with_transport(
      config(Provider::Anthropic),
      transport
    ));

    let err = assert_err!(
      PromptAnalyzer::new(gateway).dual_analyze("Hello world", "").await
    );
    match err
    {   Error::Analysis { source, .. } => {
          assert_eq!(*source, Error::Transport("connection refused".to_string()));
        }
      , other => panic!("unexpected error: {:?}", other)
    }
}
