//! Diagnostic events emitted by the completion client and normalizer

use log::{debug, error, info};
use std::sync::Mutex;

/// One diagnostic event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic
{   /// Full prompt about to be sent
    PromptSent(String)
  , /// Transport failed with this message
    TransportFailed(String)
  , /// Credentials incomplete; nothing was sent
    NotConfigured(String)
  , /// Original and normalized titles
    TitleAudit
    {   original: String
      , normalized: String
    }
  , /// Catalog lookup missed
    ProductNotFound(u64)
}

/// Receiver for diagnostics; the core emits, the host decides where they go
pub trait DiagnosticSink: Send + Sync
{   fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink
{   fn emit(&self, diagnostic: Diagnostic)
    {   match diagnostic
        {   Diagnostic::PromptSent(prompt) => {
              debug!("Full prompt sent to completion service: {}", prompt);
            }
          , Diagnostic::TransportFailed(msg) => {
              error!("Error querying completion service: {}", msg);
            }
          , Diagnostic::NotConfigured(msg) => {
              error!("Completion settings not configured: {}", msg);
            }
          , Diagnostic::TitleAudit { original, normalized } => {
              info!("Original title: {}", original);
              info!("Normalized title: {}", normalized);
            }
          , Diagnostic::ProductNotFound(id) => {
              error!("Product not found: {}", id);
            }
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemorySink
{   events: Mutex<Vec<Diagnostic>>
}

impl MemorySink
{   pub fn new() -> Self
    {   Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<Diagnostic>
    {   self.events
          .lock()
          .map(|events| events.clone())
          .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink
{   fn emit(&self, diagnostic: Diagnostic)
    {   if let Ok(mut events) = self.events.lock()
        {   events.push(diagnostic);
        }
    }
}
