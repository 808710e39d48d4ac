//! Asks a model for a code review in a marker-delimited format and prints the
//! extracted value. Runs offline against a scripted reply unless a provider is
//! selected.

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, ValueEnum};
use easy_prompter::adapters::ModelClient;
use easy_prompter::adapters::ollama::{OllamaClient, OllamaConfig};
use easy_prompter::adapters::openai::{OpenAiClient, OpenAiConfig};
use easy_prompter::adapters::scripted::ScriptedClient;
use easy_prompter::prelude::*;
use easy_prompter::telemetry::{CroppingLogger, PrintLogger, init_tracing};
use tracing::info;

const SNIPPET: &str = "fn average(values: &[f64]) -> f64 {\n    values.iter().sum::<f64>() / values.len() as f64\n}";

const SCRIPTED_REPLY: &str = "The function divides by zero for empty input.\n\
[[reject]]\n\
[[issues]]\n\
[[issue]] empty slice [[severity]] {\"level\": \"high\", \"line\": 2}\n\
[[fix]]\n\
```rust\n\
fn average(values: &[f64]) -> Option<f64> {\n\
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)\n\
}\n\
```\n";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Provider {
    Scripted,
    Openai,
    Ollama,
}

#[derive(Debug, Parser)]
#[command(about = "Extract a structured code review from a model reply")]
struct Args {
    /// Backend serving the model.
    #[arg(long, value_enum, default_value = "scripted")]
    provider: Provider,
    /// Model identifier for real providers.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,
}

fn client(args: &Args) -> Result<Arc<dyn ModelClient>> {
    Ok(match args.provider {
        Provider::Scripted => Arc::new(ScriptedClient::new([SCRIPTED_REPLY])),
        Provider::Openai => Arc::new(OpenAiClient::new(
            OpenAiConfig::from_env(&args.model).with_temperature(0.0),
        )?),
        Provider::Ollama => Arc::new(OllamaClient::new(OllamaConfig::new(&args.model))?),
    })
}

fn review() -> Result<Choice> {
    let accept = List::new(
        "If the code is correct",
        [
            Item::new("accept"),
            Item::with("praise", Data::text("Say in one sentence what is good about it")),
        ],
    )?;
    let issues = Repetition::new(
        "For every problem you found",
        [
            Item::new("issue"),
            Item::with(
                "severity",
                Data::json("Write a JSON object with the fields \"level\" and \"line\""),
            ),
        ],
    )?;
    let reject = List::new(
        "If the code has problems",
        [
            Item::new("reject"),
            Item::with("issues", issues),
            Item::with("fix", Code::new("Rewrite the function without the problems").with_language("rust")),
        ],
    )?;
    Ok(Choice::new("Review the code and pick one option", [accept, reject])?)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let logger = Arc::new(CroppingLogger::new(Arc::new(PrintLogger::new())));
    logger.add_crop(6, 1);

    let mut prompter = Prompter::builder(client(&args)?)
        .tag("review")
        .logger(logger)
        .build();
    prompter
        .append_message(
            format!("You review Rust code.\n```rust\n{SNIPPET}\n```"),
            Role::Developer,
        )
        .await?;

    let value = prompter.get_structured_reply(&review()?, Role::User).await?;
    let (verdict, details) = value.as_choice().context("reply is not a choice")?;
    info!(verdict, "review extracted");

    match verdict {
        "accept" => {
            let praise = details.as_list().and_then(|items| items[1].as_text());
            println!("accepted: {}", praise.unwrap_or_default());
        }
        "reject" => {
            let items = details.as_list().context("reject option is a list")?;
            for group in items[1].as_list().unwrap_or_default() {
                let fields = group.as_list().unwrap_or_default();
                let issue = fields.first().and_then(Value::as_text).unwrap_or_default();
                let severity = fields.get(1).and_then(Value::as_json);
                println!("issue: {issue} ({})", serde_json::to_string(&severity)?);
            }
            println!("fix:\n{}", items[2].as_text().unwrap_or_default());
        }
        other => bail!("unexpected option {other}"),
    }
    Ok(())
}
