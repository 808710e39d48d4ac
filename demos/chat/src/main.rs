//! Interactive chat loop: every turn asks for a line on stdin, then lets the
//! model answer. Type `x` or press Ctrl+D to leave.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use easy_prompter::adapters::ModelClient;
use easy_prompter::adapters::ollama::{OllamaClient, OllamaConfig};
use easy_prompter::adapters::openai::{OpenAiClient, OpenAiConfig};
use easy_prompter::kernel::{PrompterConfig, StdinInteraction};
use easy_prompter::prelude::*;
use easy_prompter::telemetry::{PrintLogger, init_tracing};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Provider {
    Openai,
    Ollama,
}

#[derive(Debug, Parser)]
#[command(about = "Chat with a model from the terminal")]
struct Args {
    /// Backend serving the model.
    #[arg(long, value_enum, default_value = "openai")]
    provider: Provider,
    /// Model identifier.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
    /// Sampling temperature; 0 keeps replies reproducible for the cache.
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,
    /// Directory of the completion cache.
    #[arg(long, default_value = "completions")]
    cache_dir: PathBuf,
}

fn client(args: &Args) -> Result<Arc<dyn ModelClient>> {
    Ok(match args.provider {
        Provider::Openai => Arc::new(OpenAiClient::new(
            OpenAiConfig::from_env(&args.model).with_temperature(args.temperature),
        )?),
        Provider::Ollama => Arc::new(OllamaClient::new(
            OllamaConfig::new(&args.model).with_temperature(args.temperature),
        )?),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut prompter = Prompter::builder(client(&args)?)
        .cache_dir(&args.cache_dir)
        .tag("example")
        .config(&PrompterConfig::from_env()?)
        .logger(Arc::new(PrintLogger::new()))
        .interaction(Arc::new(StdinInteraction::stdin(Role::User)))
        .build();

    prompter
        .append_message(
            "You are a ChatBot and should talk with the user",
            Role::Developer,
        )
        .await?;

    loop {
        match prompter.request_completion(None).await {
            Ok(()) => {}
            Err(err) if err.is_aborted() => {
                info!(messages = prompter.messages().len(), "chat ended");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }
}
