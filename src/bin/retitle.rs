//! Normalize a product title from the command line.
//!
//! ```text
//! OPENAI_API_KEY=sk-... OPENAI_MODEL=gpt-4 retitle cool gadget $19.99 model iii
//! OPENAI_API_KEY=sk-... OPENAI_MODEL=gpt-4 retitle --test
//! ```
//!
//! `RETITLE_CONFIG` may point at a JSON `ClientConfig`.

use log::error;
use retitle::{ClientConfig, CompletionClient, Credentials, Normalizer};
use std::process::ExitCode;

fn usage() -> ExitCode
{   eprintln!("usage: retitle <title...> | retitle --test");
    ExitCode::from(2)
}

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Command
{   Normalize(String)
  , TestConnection
}

/// `None` means the arguments are unusable.
fn parse_args(args: &[String]) -> Option<Command>
{   match args
    {   [] => None
      , [flag] if flag == "--test" => Some(Command::TestConnection)
      , _ if args.iter().any(|a| a == "--test") => None
      , _ => Some(Command::Normalize(args.join(" ")))
    }
}

fn load_config() -> Result<ClientConfig, retitle::Error>
{   match std::env::var("RETITLE_CONFIG")
    {   Ok(path) => ClientConfig::from_json_file(path)
      , Err(_) => Ok(ClientConfig::default())
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args)
    {   Some(command) => command
      , None => return usage()
    };

    let normalizer = match load_config()
      .and_then(|config| CompletionClient::from_config(&config))
    {   Ok(client) => Normalizer::new(client)
      , Err(e) => {
          error!("{}", e);
          eprintln!("{}", e);
          return ExitCode::FAILURE;
        }
    };
    let credentials = Credentials::from_env();

    let title = match command
    {   Command::Normalize(title) => title
      , Command::TestConnection => {
          return match normalizer.test_connection(&credentials).await
          {   Ok(reply) => {
                println!("{}", reply);
                ExitCode::SUCCESS
              }
            , Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
              }
          };
        }
    };

    let result = normalizer.normalize_title(&title, &credentials).await;
    match result.title()
    {   Some(normalized) => {
          println!("{}", normalized);
          ExitCode::SUCCESS
        }
      , None => {
          if let retitle::NormalizationResult::Failed { reason } = &result
          {   eprintln!("{}", reason);
          }
          ExitCode::FAILURE
        }
    }
}
