use std::fmt;

/// Error type for title normalization
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key or model missing; no request was sent
    Configuration(String)
  , /// Network, TLS or connection failure
    Transport(String)
  , /// Request succeeded but yielded no usable text
    EmptyResult
  , /// Catalog has no product with this id
    ProductNotFound(u64)
  , /// Config file could not be read or parsed
    InvalidConfiguration(String)
  , /// Backend task is gone
    BackendDisconnected
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Configuration(msg) => {
              write!(f, "Settings not configured: {}", msg)
            }
          , Error::Transport(msg) => {
              write!(f, "Transport error: {}", msg)
            }
          , Error::EmptyResult => {
              write!(f, "Completion returned no content")
            }
          , Error::ProductNotFound(id) => {
              write!(f, "Product not found: {}", id)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::BackendDisconnected => {
              write!(f, "Backend disconnected")
            }
        }
    }
}

impl std::error::Error for Error {}
