use std::sync::Arc;
use log::{debug, trace};

use crate::config::{ClientConfig, Credentials};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::request::{extract_content, CompletionRequest};
use crate::transport::{HttpTransport, Transport};

/// One request/response exchange with the chat completion endpoint
#[derive(Clone)]
pub struct CompletionClient
{   transport: Arc<dyn Transport>
  , diagnostics: Arc<dyn DiagnosticSink>
  , endpoint: String
}

impl CompletionClient
{   pub fn new(
      transport: Arc<dyn Transport>
    , diagnostics: Arc<dyn DiagnosticSink>
    , endpoint: impl Into<String>
    ) -> Self
    {   CompletionClient
        {   transport
          , diagnostics
          , endpoint: endpoint.into()
        }
    }

    /// HTTP transport and `log` diagnostics built from `config`
    pub fn from_config(config: &ClientConfig)
      -> Result<Self, crate::error::Error>
    {   debug!("Creating CompletionClient for {}", config.endpoint);
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(
          Arc::new(transport)
        , Arc::new(LogSink)
        , config.endpoint.clone()
        ))
    }

    pub fn endpoint(&self) -> &str
    {   &self.endpoint
    }

    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink>
    {   &self.diagnostics
    }

    /// Send `prompt` and return `choices[0].message.content`.
    ///
    /// Incomplete credentials fail before any I/O. A transport failure is an
    /// error; a body without usable content is `Ok("")`.
    pub async fn complete(
      &self
    , prompt: &str
    , credentials: &Credentials
    ) -> Result<String, crate::error::Error>
    {   if let Some(field) = credentials.missing_field()
        {   let msg = format!("{} is not set", field);
            self.diagnostics.emit(Diagnostic::NotConfigured(msg.clone()));
            return Err(crate::error::Error::Configuration(msg));
        }

        self.diagnostics.emit(Diagnostic::PromptSent(prompt.to_string()));

        let request = CompletionRequest::new(&credentials.model, prompt);
        let body = serde_json::to_string(&request).map_err(|e| {
          crate::error::Error::Transport(e.to_string())
        })?;
        trace!("Completion request: {}", body);

        let response = self.transport
          .post_json(&self.endpoint, &credentials.api_key, body)
          .await
          .map_err(|msg| {
            self.diagnostics.emit(Diagnostic::TransportFailed(msg.clone()));
            crate::error::Error::Transport(msg)
          })?;

        Ok(extract_content(&response))
    }
}
