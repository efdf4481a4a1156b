//! retitle: product title normalization through a chat completion service.
//!
//! ```text
//! UI action -> Normalizer -> build_prompt -> CompletionClient -> Transport
//!                  |
//!                  +-> NormalizationResult (success title or failure notice)
//! ```
//!
//! The core (`prompt`, `completion`, `normalizer`) takes credentials, the
//! transport and the diagnostic sink as parameters. `backend` wraps a
//! `Normalizer` in a task that serves UI actions one at a time.

pub mod error;
pub mod config;
pub mod prompt;
pub mod request;
pub mod diagnostics;
pub mod transport;
pub mod completion;
pub mod normalizer;
pub mod catalog;
pub mod backend;

pub use backend::NormalizerBackend;
pub use completion::CompletionClient;
pub use config::{ClientConfig, Credentials};
pub use error::Error;
pub use normalizer::{NormalizationResult, Normalizer};

/// BACKEND INTERFACE:

// ===== NormalizeTitle =====

pub type NormalizeTitleReplySender
  = tokio::sync::mpsc::UnboundedSender<NormalizationResult>;

pub struct NormalizeTitleArgs
{   pub title: String
  , pub reply: NormalizeTitleReplySender
}

// ===== NormalizeProduct =====

pub type NormalizeProductReply
  = Result<NormalizationResult, crate::error::Error>;
pub type NormalizeProductReplySender
  = tokio::sync::mpsc::UnboundedSender<NormalizeProductReply>;

pub struct NormalizeProductArgs
{   pub product_id: catalog::ProductId
  , pub reply: NormalizeProductReplySender
}

// ===== TestConnection =====

pub type TestConnectionReply = Result<String, crate::error::Error>;
pub type TestConnectionReplySender
  = tokio::sync::mpsc::UnboundedSender<TestConnectionReply>;

pub struct TestConnectionArgs
{   pub reply: TestConnectionReplySender
}

// ===== SetCredentials =====

pub type SetCredentialsReply = Result<(), crate::error::Error>;
pub type SetCredentialsReplySender
  = tokio::sync::mpsc::UnboundedSender<SetCredentialsReply>;

pub struct SetCredentialsArgs
{   pub credentials: Credentials
  , pub reply: SetCredentialsReplySender
}

// ===== ListModels =====

pub type ListModelsReplySender
  = tokio::sync::mpsc::UnboundedSender<Vec<String>>;

pub struct ListModelsArgs
{   pub reply: ListModelsReplySender
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), crate::error::Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== BackendHand (sender side) =====

pub struct BackendHand
{   pub normalize_title_tx
      : tokio::sync::mpsc::UnboundedSender<NormalizeTitleArgs>
  , pub normalize_product_tx
      : tokio::sync::mpsc::UnboundedSender<NormalizeProductArgs>
  , pub test_connection_tx
      : tokio::sync::mpsc::UnboundedSender<TestConnectionArgs>
  , pub set_credentials_tx
      : tokio::sync::mpsc::UnboundedSender<SetCredentialsArgs>
  , pub list_models_tx
      : tokio::sync::mpsc::UnboundedSender<ListModelsArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== BackendFoot (receiver side) =====

pub struct BackendFoot
{   pub normalize_title_rx
      : tokio::sync::mpsc::UnboundedReceiver<NormalizeTitleArgs>
  , pub normalize_product_rx
      : tokio::sync::mpsc::UnboundedReceiver<NormalizeProductArgs>
  , pub test_connection_rx
      : tokio::sync::mpsc::UnboundedReceiver<TestConnectionArgs>
  , pub set_credentials_rx
      : tokio::sync::mpsc::UnboundedReceiver<SetCredentialsArgs>
  , pub list_models_rx
      : tokio::sync::mpsc::UnboundedReceiver<ListModelsArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}
