use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};

use crate::catalog::{ProductCatalog, ProductId};
use crate::config::{Credentials, KNOWN_MODELS};
use crate::diagnostics::Diagnostic;
use crate::normalizer::{NormalizationResult, Normalizer};
use crate::BackendFoot;

/// State owned by the backend task
pub struct BackendState
{   pub normalizer: Normalizer
  , pub catalog: Arc<dyn ProductCatalog>
  , pub credentials: Credentials
}

impl BackendState
{   async fn handle_normalize_product(
      &self
    , product_id: ProductId
    ) -> crate::NormalizeProductReply
    {   let title = match self.catalog.product_title(product_id).await
        {   Some(title) => title
          , None => {
              self.normalizer.client().diagnostics()
                .emit(Diagnostic::ProductNotFound(product_id));
              return Err(crate::error::Error::ProductNotFound(product_id));
            }
        };
        Ok(self.normalizer
          .normalize_title(&title, &self.credentials)
          .await)
    }
}

/// Handle to the normalization task. Commands run one at a time, so at
/// most one completion request is in flight per backend.
pub struct NormalizerBackend
{   hand: crate::BackendHand
  , _task_handle: tokio::task::JoinHandle<()>
}

fn disconnected<T>(_: mpsc::error::SendError<T>) -> crate::error::Error
{   error!("Backend channel closed");
    crate::error::Error::BackendDisconnected
}

impl NormalizerBackend
{   /// Spawn the backend task; returns immediately
    pub fn new(
      normalizer: Normalizer
    , catalog: Arc<dyn ProductCatalog>
    , credentials: Credentials
    ) -> Self
    {   debug!("Creating NormalizerBackend");

        let (normalize_title_tx, normalize_title_rx)
          = mpsc::unbounded_channel();
        let (normalize_product_tx, normalize_product_rx)
          = mpsc::unbounded_channel();
        let (test_connection_tx, test_connection_rx)
          = mpsc::unbounded_channel();
        let (set_credentials_tx, set_credentials_rx)
          = mpsc::unbounded_channel();
        let (list_models_tx, list_models_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let hand = crate::BackendHand
        {   normalize_title_tx
          , normalize_product_tx
          , test_connection_tx
          , set_credentials_tx
          , list_models_tx
          , shutdown_tx
        };

        let foot = crate::BackendFoot
        {   normalize_title_rx
          , normalize_product_rx
          , test_connection_rx
          , set_credentials_rx
          , list_models_rx
          , shutdown_rx
        };

        let state = BackendState
        {   normalizer
          , catalog
          , credentials
        };

        let _task_handle = tokio::spawn(async move {
          run_backend_loop(foot, state).await
        });

        NormalizerBackend
        {   hand
          , _task_handle
        }
    }

    /// Normalize a raw title
    pub fn normalize_title(
      &self
    , title: impl Into<String>
    ) -> Result<
        mpsc::UnboundedReceiver<NormalizationResult>,
        crate::error::Error
      >
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.normalize_title_tx
          .send(crate::NormalizeTitleArgs
          {   title: title.into()
            , reply
          })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Look up a product's title in the catalog and normalize it
    pub fn normalize_product(
      &self
    , product_id: ProductId
    ) -> Result<
        mpsc::UnboundedReceiver<crate::NormalizeProductReply>,
        crate::error::Error
      >
    {   debug!("normalize_product queuing {}", product_id);
        let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.normalize_product_tx
          .send(crate::NormalizeProductArgs
          {   product_id
            , reply
          })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Send the probe prompt with the current credentials
    pub fn test_connection(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::TestConnectionReply>,
        crate::error::Error
      >
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.test_connection_tx
          .send(crate::TestConnectionArgs { reply })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Replace the credentials used by later requests
    pub fn set_credentials(
      &self
    , credentials: Credentials
    ) -> Result<
        mpsc::UnboundedReceiver<crate::SetCredentialsReply>,
        crate::error::Error
      >
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.set_credentials_tx
          .send(crate::SetCredentialsArgs
          {   credentials
            , reply
          })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    pub fn list_models(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<Vec<String>>,
        crate::error::Error
      >
    {   let (reply, reply_rx) = mpsc::unbounded_channel();
        self.hand.list_models_tx
          .send(crate::ListModelsArgs { reply })
          .map_err(disconnected)?;
        Ok(reply_rx)
    }

    /// Stop the task and wait for confirmation
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down NormalizerBackend");
        let (reply, mut reply_rx) = mpsc::unbounded_channel();

        self.hand.shutdown_tx
          .send(crate::ShutdownArgs { reply })
          .map_err(disconnected)?;

        match reply_rx.recv().await
        {   Some(result) => result
          , None => {
              error!("Backend exited before confirming shutdown");
              Err(crate::error::Error::BackendDisconnected)
            }
        }
    }
}

/// Main backend event loop.
/// Each arm awaits its work before the next command is taken.
async fn run_backend_loop(
  foot: BackendFoot
, mut state: BackendState
)
{   debug!("Starting NormalizerBackend event loop");
    let BackendFoot
    {   mut normalize_title_rx
      , mut normalize_product_rx
      , mut test_connection_rx
      , mut set_credentials_rx
      , mut list_models_rx
      , mut shutdown_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = normalize_title_rx.recv() => {
          debug!("Received NormalizeTitle");
          let result = state.normalizer
            .normalize_title(&cmd.title, &state.credentials)
            .await;
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = normalize_product_rx.recv() => {
          debug!("Received NormalizeProduct for {}", cmd.product_id);
          let result = state
            .handle_normalize_product(cmd.product_id)
            .await;
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = test_connection_rx.recv() => {
          debug!("Received TestConnection");
          let result = state.normalizer
            .test_connection(&state.credentials)
            .await;
          let _ = cmd.reply.send(result);
        }
      , Some(cmd) = set_credentials_rx.recv() => {
          debug!("Received SetCredentials: {:?}", cmd.credentials);
          state.credentials = cmd.credentials;
          let _ = cmd.reply.send(Ok(()));
        }
      , Some(cmd) = list_models_rx.recv() => {
          debug!("Received ListModels");
          let models = KNOWN_MODELS
            .iter()
            .map(|m| m.to_string())
            .collect();
          let _ = cmd.reply.send(models);
        }
      , Some(cmd) = shutdown_rx.recv() => {
          let _ = cmd.reply.send(Ok(()));
          info!("NormalizerBackend shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
