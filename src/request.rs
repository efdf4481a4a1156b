//! Chat completion wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sampling temperature used for every normalization request
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
}

impl CompletionRequest
{   /// Single user message carrying `prompt`
    pub fn new(model: &str, prompt: &str) -> Self
    {   CompletionRequest
        {   model: model.to_string()
          , messages: vec![ChatMessage::user(prompt)]
          , temperature: TEMPERATURE
        }
    }
}

/// Pull `choices[0].message.content` out of a raw response body.
///
/// Only that path is read; the rest of the body may be anything. Bad JSON,
/// no choices or a non-string content all yield an empty string.
pub fn extract_content(body: &str) -> String
{   serde_json::from_str::<Value>(body)
      .ok()
      .as_ref()
      .and_then(|v| v.pointer("/choices/0/message/content"))
      .and_then(Value::as_str)
      .map(str::to_string)
      .unwrap_or_default()
}
