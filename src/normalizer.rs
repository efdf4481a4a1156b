//! Title normalization: prompt, completion, classification

use log::debug;
use serde::{Deserialize, Serialize};

use crate::completion::CompletionClient;
use crate::config::Credentials;
use crate::diagnostics::Diagnostic;
use crate::prompt::{build_prompt, PROBE_PROMPT};

/// Failure text shown to the merchant
pub const FAILURE_MESSAGE: &str = "Failed to normalize.";

/// Outcome of one normalization request.
///
/// Serializes to the ajax reply envelope the product editor expects:
/// `{"success":true,"data":"<title>"}` or
/// `{"success":false,"data":"Failed to normalize."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "AjaxReply", from = "AjaxReply")]
pub enum NormalizationResult
{   Normalized(String)
  , Failed
    {   reason: String
    }
}

impl NormalizationResult
{   pub fn failed() -> Self
    {   NormalizationResult::Failed
        {   reason: FAILURE_MESSAGE.to_string()
        }
    }

    pub fn is_success(&self) -> bool
    {   matches!(self, NormalizationResult::Normalized(_))
    }

    pub fn title(&self) -> Option<&str>
    {   match self
        {   NormalizationResult::Normalized(title) => Some(title)
          , NormalizationResult::Failed { .. } => None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AjaxReply
{   success: bool
  , data: String
}

impl From<NormalizationResult> for AjaxReply
{   fn from(result: NormalizationResult) -> Self
    {   match result
        {   NormalizationResult::Normalized(title) => AjaxReply
            {   success: true
              , data: title
            }
          , NormalizationResult::Failed { reason } => AjaxReply
            {   success: false
              , data: reason
            }
        }
    }
}

impl From<AjaxReply> for NormalizationResult
{   fn from(reply: AjaxReply) -> Self
    {   if reply.success
        {   NormalizationResult::Normalized(reply.data)
        } else
        {   NormalizationResult::Failed { reason: reply.data }
        }
    }
}

/// Sequences prompt construction, the completion call and classification
#[derive(Clone)]
pub struct Normalizer
{   client: CompletionClient
}

impl Normalizer
{   pub fn new(client: CompletionClient) -> Self
    {   Normalizer { client }
    }

    pub fn client(&self) -> &CompletionClient
    {   &self.client
    }

    /// Normalize one product title. Never writes it back anywhere.
    pub async fn normalize_title(
      &self
    , title: &str
    , credentials: &Credentials
    ) -> NormalizationResult
    {   let prompt = build_prompt(title);
        let raw = self.client.complete(&prompt, credentials).await;

        let normalized = match &raw
        {   Ok(text) => text.clone()
          , Err(_) => String::new()
        };
        self.client.diagnostics().emit(Diagnostic::TitleAudit
        {   original: title.to_string()
          , normalized
        });

        match raw
        {   Ok(text) if !text.is_empty() => {
              NormalizationResult::Normalized(text)
            }
          , Ok(_) => {
              debug!("{}", crate::error::Error::EmptyResult);
              NormalizationResult::failed()
            }
          , Err(e) => {
              debug!("Normalization failed: {}", e);
              NormalizationResult::failed()
            }
        }
    }

    /// Settings-screen connection test; returns the raw reply
    pub async fn test_connection(
      &self
    , credentials: &Credentials
    ) -> Result<String, crate::error::Error>
    {   self.client.complete(PROBE_PROMPT, credentials).await
    }
}
