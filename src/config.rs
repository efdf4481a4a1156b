//! Credentials and client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Production chat completion endpoint
pub const OPENAI_CHAT_COMPLETIONS_URL: &str
  = "https://api.openai.com/v1/chat/completions";

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Models offered on the settings screen
pub const KNOWN_MODELS: [&str; 3]
  = ["gpt-3.5-turbo", "gpt-4", "text-davinci-003"];

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// API key and model pair for the completion service
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials
{   pub api_key: String
  , pub model: String
}

impl Credentials
{   pub fn new(
      api_key: impl Into<String>
    , model: impl Into<String>
    ) -> Self
    {   Credentials
        {   api_key: api_key.into()
          , model: model.into()
        }
    }

    /// Read `OPENAI_API_KEY` and `OPENAI_MODEL`; unset means empty
    pub fn from_env() -> Self
    {   Credentials
        {   api_key: std::env::var(API_KEY_ENV).unwrap_or_default()
          , model: std::env::var(MODEL_ENV).unwrap_or_default()
        }
    }

    /// Name of the first missing field, if any
    pub fn missing_field(&self) -> Option<&'static str>
    {   if self.api_key.is_empty()
        {   Some("api key")
        } else if self.model.is_empty()
        {   Some("model")
        } else
        {   None
        }
    }

    pub fn is_complete(&self) -> bool
    {   self.missing_field().is_none()
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for Credentials
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("Credentials")
          .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
          .field("model", &self.model)
          .finish()
    }
}

/// Completion client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig
{   /// Chat completion endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String
  , /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64
}

fn default_endpoint() -> String
{   OPENAI_CHAT_COMPLETIONS_URL.to_string()
}

fn default_timeout_secs() -> u64
{   DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   endpoint: default_endpoint()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

impl ClientConfig
{   pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self
    {   self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self
    {   self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
          crate::error::Error::InvalidConfiguration(
            format!("{}: {}", path.display(), e)
          )
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str)
      -> Result<Self, crate::error::Error>
    {   serde_json::from_str(text).map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })
    }
}
