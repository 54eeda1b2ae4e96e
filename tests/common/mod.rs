#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use promptforge::{ChatGenerator, Error, Message, Result, Role};

/// How a scripted call answers
#[derive(Debug, Clone)]
pub enum Script
{   Reply(String)
  , Fail(Error)
  , /// Never completes
    Hang
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct RecordedCall
{   pub messages: Vec<Message>
  , pub temperature: f32
  , pub max_tokens: i64
  , pub model: String
}

/// Stub generator that answers quick-critique calls (system prompt
/// mentions QUICK) and every other call from separate scripts.
pub struct ScriptedGenerator
{   quick: Script
  , other: Script
  , calls: Mutex<Vec<RecordedCall>>
}

impl ScriptedGenerator
{   pub fn new(quick: Script, other: Script) -> Self
    {   ScriptedGenerator
        {   quick
          , other
          , calls: Mutex::new(Vec::new())
        }
    }

    pub fn replying(text: &str) -> Self
    {   Self::new(Script::Reply(text.to_string()), Script::Reply(text.to_string()))
    }

    pub fn calls(&self) -> Vec<RecordedCall>
    {   self.calls.lock().unwrap().clone()
    }
}

fn is_quick(messages: &[Message]) -> bool
{   messages
      .iter()
      .any(|m| m.role == Role::System && m.content.contains("QUICK"))
}

#[async_trait]
impl ChatGenerator for ScriptedGenerator
{   async fn generate_text(
      &self
    , messages: Vec<Message>
    , temperature: f32
    , max_tokens: i64
    , model: &str
    ) -> Result<String>
    {   let script = if is_quick(&messages)
        {   self.quick.clone()
        } else
        {   self.other.clone()
        };
        self.calls.lock().unwrap().push(RecordedCall
        {   messages
          , temperature
          , max_tokens
          , model: model.to_string()
        });

        match script
        {   Script::Reply(text) => Ok(text)
          , Script::Fail(e) => Err(e)
          , Script::Hang => std::future::pending().await
        }
    }
}
