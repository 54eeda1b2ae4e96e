//! HTTP exchange seam between the provider adapters and the network

use std::time::Duration;

use async_trait::async_trait;
use log::trace;

use crate::error::{Error, Result};

/// Raw outcome of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply
{   pub status: u16
  , pub body: String
}

impl HttpReply
{   pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}

/// Performs a JSON POST and hands back status and body untouched.
/// Adapters own status interpretation and body parsing.
#[async_trait]
pub trait HttpTransport: Send + Sync
{   async fn post_json(
      &self
    , url: &str
    , headers: &[(&'static str, String)]
    , body: String
    ) -> Result<HttpReply>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport
{   http_client: reqwest::Client
}

impl ReqwestTransport
{   pub fn new(timeout: Duration) -> Result<Self>
    {   let http_client = reqwest::Client::builder()
          .timeout(timeout)
          .build()?;
        Ok(ReqwestTransport { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport
{   async fn post_json(
      &self
    , url: &str
    , headers: &[(&'static str, String)]
    , body: String
    ) -> Result<HttpReply>
    {   trace!("POST {} ({} bytes)", url, body.len());

        let mut request = self.http_client
          .post(url)
          .header("Content-Type", "application/json")
          .body(body);
        for (name, value) in headers
        {   request = request.header(*name, value.as_str());
        }

        let response = request
          .send()
          .await
          .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        trace!("Response status: {}", status);

        let body = response
          .text()
          .await
          .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}
