use async_trait::async_trait;
use retitle::catalog::InMemoryCatalog;
use retitle::diagnostics::{Diagnostic, MemorySink};
use retitle::prompt::{build_prompt, PROBE_PROMPT};
use retitle::request::CompletionRequest;
use retitle::transport::Transport;
use retitle::{
  CompletionClient, Credentials, Error, NormalizationResult,
  Normalizer, NormalizerBackend
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const ENDPOINT: &str = "https://completions.test/v1/chat/completions";

/// One recorded outbound request
#[derive(Debug, Clone)]
struct SentRequest
{   url: String
  , bearer_token: String
  , body: String
}

/// Transport that answers every call with the same canned reply
struct FakeTransport
{   reply: Result<String, String>
  , sent: Mutex<Vec<SentRequest>>
  , in_flight: AtomicUsize
  , max_in_flight: AtomicUsize
  , delay: Duration
}

impl FakeTransport
{   fn replying(body: &str) -> Arc<Self>
    {   Arc::new(FakeTransport
        {   reply: Ok(body.to_string())
          , sent: Mutex::new(vec![])
          , in_flight: AtomicUsize::new(0)
          , max_in_flight: AtomicUsize::new(0)
          , delay: Duration::ZERO
        })
    }

    fn failing(msg: &str) -> Arc<Self>
    {   Arc::new(FakeTransport
        {   reply: Err(msg.to_string())
          , sent: Mutex::new(vec![])
          , in_flight: AtomicUsize::new(0)
          , max_in_flight: AtomicUsize::new(0)
          , delay: Duration::ZERO
        })
    }

    fn slow(body: &str, delay: Duration) -> Arc<Self>
    {   Arc::new(FakeTransport
        {   reply: Ok(body.to_string())
          , sent: Mutex::new(vec![])
          , in_flight: AtomicUsize::new(0)
          , max_in_flight: AtomicUsize::new(0)
          , delay
        })
    }

    fn calls(&self) -> usize
    {   self.sent.lock().unwrap().len()
    }

    fn sent(&self) -> Vec<SentRequest>
    {   self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport
{   async fn post_json(
      &self
    , url: &str
    , bearer_token: &str
    , body: String
    ) -> Result<String, String>
    {   self.sent.lock().unwrap().push(SentRequest
        {   url: url.to_string()
          , bearer_token: bearer_token.to_string()
          , body
        });
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero()
        {   tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.reply.clone()
    }
}

fn completion_body(content: &str) -> String
{   serde_json::json!({
      "choices": [{ "message": { "role": "assistant", "content": content } }]
    }).to_string()
}

fn credentials() -> Credentials
{   Credentials::new("sk-test", "gpt-4")
}

fn client_with(
  transport: Arc<FakeTransport>
) -> (CompletionClient, Arc<MemorySink>)
{   let sink = Arc::new(MemorySink::new());
    let client = CompletionClient::new(transport, sink.clone(), ENDPOINT);
    (client, sink)
}

// ===== CompletionClient =====

#[tokio::test]
async fn test_missing_credentials_never_touch_network()
{   let transport = FakeTransport::replying(&completion_body("unused"));
    let (client, sink) = client_with(transport.clone());

    for creds in [
      Credentials::new("", "gpt-4")
    , Credentials::new("sk-test", "")
    , Credentials::default()
    ]
    {   let result = client.complete("prompt", &creds).await;
        assert!(
          matches!(result, Err(Error::Configuration(_))),
          "expected configuration error, got {:?}", result
        );
    }

    assert_eq!(transport.calls(), 0);
    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| matches!(e, Diagnostic::NotConfigured(_))));
}

#[tokio::test]
async fn test_transport_failure_wraps_message()
{   let transport = FakeTransport::failing("connection refused");
    let (client, sink) = client_with(transport.clone());

    let result = client.complete("hello", &credentials()).await;
    assert_eq!(
      result,
      Err(Error::Transport("connection refused".to_string()))
    );
    assert_eq!(transport.calls(), 1);
    assert_eq!(
      sink.events(),
      vec![
        Diagnostic::PromptSent("hello".to_string())
      , Diagnostic::TransportFailed("connection refused".to_string())
      ]
    );
}

#[tokio::test]
async fn test_successful_completion_returns_content()
{   let transport = FakeTransport::replying(
      r#"{"choices":[{"message":{"content":"Wireless Mouse MSRP USD 29.99"}}]}"#
    );
    let (client, sink) = client_with(transport.clone());

    let result = client.complete("wireless mouse", &credentials()).await;
    assert_eq!(result, Ok("Wireless Mouse MSRP USD 29.99".to_string()));
    assert_eq!(
      sink.events(),
      vec![Diagnostic::PromptSent("wireless mouse".to_string())]
    );
}

#[tokio::test]
async fn test_request_shape()
{   let transport = FakeTransport::replying(&completion_body("ok"));
    let (client, _sink) = client_with(transport.clone());

    client.complete("the prompt", &credentials()).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, ENDPOINT);
    assert_eq!(sent[0].bearer_token, "sk-test");
    let body: CompletionRequest = serde_json::from_str(&sent[0].body).unwrap();
    assert_eq!(body, CompletionRequest::new("gpt-4", "the prompt"));
}

#[tokio::test]
async fn test_unusable_bodies_succeed_with_empty_string()
{   for body in ["{}", "not json", r#"{"choices":[]}"#]
    {   let transport = FakeTransport::replying(body);
        let (client, _sink) = client_with(transport);
        let result = client.complete("p", &credentials()).await;
        assert_eq!(result, Ok(String::new()), "body: {}", body);
    }
}

#[tokio::test]
async fn test_repeated_calls_are_not_cached()
{   let transport = FakeTransport::replying(&completion_body("Same"));
    let (client, _sink) = client_with(transport.clone());

    for _ in 0..3
    {   let reply = client.complete("same prompt", &credentials()).await;
        assert!(reply.is_ok());
    }
    assert_eq!(transport.calls(), 3);
}

// ===== Normalizer =====

#[tokio::test]
async fn test_normalize_title_success()
{   let transport = FakeTransport::replying(
      &completion_body("Cool Gadget USD 19.99 Model III")
    );
    let (client, sink) = client_with(transport.clone());
    let normalizer = Normalizer::new(client);

    let result = normalizer
      .normalize_title("cool gadget $19.99 model iii", &credentials())
      .await;

    assert!(result.is_success());
    assert!(!result.title().unwrap().is_empty());

    let sent: CompletionRequest
      = serde_json::from_str(&transport.sent()[0].body).unwrap();
    assert_eq!(
      sent.messages[0].content,
      "normalize to title case; keep case of MSRP, roman numerals; \
       replace $ with USD: cool gadget $19.99 model iii"
    );

    let events = sink.events();
    assert_eq!(
      events.last(),
      Some(&Diagnostic::TitleAudit
      {   original: "cool gadget $19.99 model iii".to_string()
        , normalized: "Cool Gadget USD 19.99 Model III".to_string()
      })
    );
}

#[tokio::test]
async fn test_normalize_title_empty_reply_is_failure()
{   let empty_content = completion_body("");
    for body in ["{}", "<html>bad gateway</html>", empty_content.as_str()]
    {   let transport = FakeTransport::replying(body);
        let (client, _sink) = client_with(transport);
        let result = Normalizer::new(client)
          .normalize_title("mouse", &credentials())
          .await;
        assert_eq!(result, NormalizationResult::failed());
        assert_eq!(
          result,
          NormalizationResult::Failed
          {   reason: "Failed to normalize.".to_string()
          }
        );
    }
}

#[tokio::test]
async fn test_normalize_title_errors_are_failures()
{   let transport = FakeTransport::failing("tls handshake eof");
    let (client, sink) = client_with(transport);
    let normalizer = Normalizer::new(client);

    let result = normalizer.normalize_title("mouse", &credentials()).await;
    assert_eq!(result, NormalizationResult::failed());
    assert!(sink.events().contains(
      &Diagnostic::TransportFailed("tls handshake eof".to_string())
    ));

    let result = normalizer
      .normalize_title("mouse", &Credentials::default())
      .await;
    assert_eq!(result, NormalizationResult::failed());
}

#[tokio::test]
async fn test_empty_title_is_still_sent()
{   let transport = FakeTransport::replying(&completion_body("Untitled"));
    let (client, _sink) = client_with(transport.clone());

    let result = Normalizer::new(client)
      .normalize_title("", &credentials())
      .await;
    assert!(result.is_success());

    let sent: CompletionRequest
      = serde_json::from_str(&transport.sent()[0].body).unwrap();
    assert_eq!(sent.messages[0].content, build_prompt(""));
}

#[tokio::test]
async fn test_connection_probe_sends_probe_prompt()
{   let transport = FakeTransport::replying(&completion_body("I am a model."));
    let (client, _sink) = client_with(transport.clone());

    let reply = Normalizer::new(client).test_connection(&credentials()).await;
    assert_eq!(reply, Ok("I am a model.".to_string()));

    let sent: CompletionRequest
      = serde_json::from_str(&transport.sent()[0].body).unwrap();
    assert_eq!(sent.messages[0].content, PROBE_PROMPT);
}

// ===== NormalizerBackend =====

fn backend_with(
  transport: Arc<FakeTransport>
, credentials: Credentials
) -> (NormalizerBackend, Arc<MemorySink>)
{   let (client, sink) = client_with(transport);
    let catalog = InMemoryCatalog::new()
      .with_product(101, "cool gadget $19.99 model iii");
    let backend = NormalizerBackend::new(
      Normalizer::new(client)
    , Arc::new(catalog)
    , credentials
    );
    (backend, sink)
}

#[tokio::test]
async fn test_backend_initialization()
{   let transport = FakeTransport::replying("{}");
    let (backend, _sink) = backend_with(transport, credentials());
    assert_eq!(backend.shutdown().await, Ok(()));
}

#[tokio::test]
async fn test_backend_normalize_title()
{   let transport = FakeTransport::replying(&completion_body("Wireless Mouse"));
    let (backend, _sink) = backend_with(transport, credentials());

    let mut rx = backend.normalize_title("wireless mouse").unwrap();
    let result = rx.recv().await.unwrap();
    assert_eq!(result, NormalizationResult::Normalized("Wireless Mouse".to_string()));

    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_backend_normalize_product()
{   let transport = FakeTransport::replying(&completion_body("Cool Gadget"));
    let (backend, sink) = backend_with(transport.clone(), credentials());

    let mut rx = backend.normalize_product(101).unwrap();
    let result = rx.recv().await.unwrap();
    assert_eq!(result, Ok(NormalizationResult::Normalized("Cool Gadget".to_string())));

    let sent: CompletionRequest
      = serde_json::from_str(&transport.sent()[0].body).unwrap();
    assert_eq!(sent.messages[0].content, build_prompt("cool gadget $19.99 model iii"));

    let mut rx = backend.normalize_product(999).unwrap();
    assert_eq!(rx.recv().await.unwrap(), Err(Error::ProductNotFound(999)));
    assert_eq!(transport.calls(), 1);
    assert!(sink.events().contains(&Diagnostic::ProductNotFound(999)));

    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_backend_set_credentials()
{   let transport = FakeTransport::replying(&completion_body("Mouse"));
    let (backend, _sink) = backend_with(transport.clone(), Credentials::default());

    let mut rx = backend.normalize_title("mouse").unwrap();
    assert_eq!(rx.recv().await.unwrap(), NormalizationResult::failed());
    assert_eq!(transport.calls(), 0);

    let mut rx = backend
      .set_credentials(Credentials::new("sk-new", "gpt-3.5-turbo"))
      .unwrap();
    assert_eq!(rx.recv().await.unwrap(), Ok(()));

    let mut rx = backend.normalize_title("mouse").unwrap();
    assert!(rx.recv().await.unwrap().is_success());
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bearer_token, "sk-new");
    let body: CompletionRequest = serde_json::from_str(&sent[0].body).unwrap();
    assert_eq!(body.model, "gpt-3.5-turbo");

    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_backend_test_connection_and_models()
{   let transport = FakeTransport::replying(&completion_body("gpt-4"));
    let (backend, _sink) = backend_with(transport, credentials());

    let mut rx = backend.test_connection().unwrap();
    assert_eq!(rx.recv().await.unwrap(), Ok("gpt-4".to_string()));

    let mut rx = backend.list_models().unwrap();
    assert_eq!(
      rx.recv().await.unwrap(),
      vec!["gpt-3.5-turbo", "gpt-4", "text-davinci-003"]
    );

    backend.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_backend_serves_one_request_at_a_time()
{   let transport = FakeTransport::slow(
      &completion_body("Mouse")
    , Duration::from_millis(20)
    );
    let (backend, _sink) = backend_with(transport.clone(), credentials());

    let mut receivers = vec![];
    for i in 0..4
    {   receivers.push(backend.normalize_title(format!("mouse {}", i)).unwrap());
    }
    for rx in receivers.iter_mut()
    {   assert!(rx.recv().await.unwrap().is_success());
    }

    assert_eq!(transport.calls(), 4);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);

    backend.shutdown().await.unwrap();
}
