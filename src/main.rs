use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use powerdrill::config::Config;
use powerdrill::{PowerdrillChatTool, Tool, ToolMessage};

mod cli;

use cli::Cli;
use cli::commands::{Commands, TargetArgs};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("powerdrill")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("powerdrill.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Merge CLI flags over config values into the tool's invocation parameters
fn build_params(config: &Config, target: &TargetArgs, question: &str) -> Value {
    let mut params = Map::new();
    let mut put = |name: &str, value: Option<&str>| {
        if let Some(v) = value {
            params.insert(name.to_string(), json!(v));
        }
    };

    put("api_key", config.api_key.as_deref());
    put("base_url", target.base_url.as_deref().or(Some(config.base_url.as_str())));
    put("user_id", target.user_id.as_deref().or(config.user_id.as_deref()));
    put("question", Some(question));
    put("dataset_id", target.dataset_id.as_deref().or(config.dataset_id.as_deref()));
    put(
        "datasource_id",
        target.datasource_id.as_deref().or(config.datasource_id.as_deref()),
    );

    params.insert(
        "with_citation".to_string(),
        json!(target.with_citation || config.with_citation),
    );
    Value::Object(params)
}

/// Print messages as they are produced; returns false if any was an error
fn render(messages: impl Iterator<Item = ToolMessage>) -> bool {
    let mut ok = true;
    for message in messages {
        match message {
            ToolMessage::Text { text } => println!("{}", text),
            ToolMessage::Image { url } => println!("{} {}", "[image]".cyan(), url),
            ToolMessage::Error { message } => {
                eprintln!("{} {}", "Error:".red(), message);
                ok = false;
            }
        }
    }
    ok
}

async fn ask(tool: &PowerdrillChatTool, config: &Config, target: &TargetArgs, question: &str) -> Result<bool> {
    info!("Asking: {}", question);
    let messages = tool
        .invoke(build_params(config, target, question))
        .await
        .context("Powerdrill request failed")?;
    Ok(render(messages))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let tool = PowerdrillChatTool::with_timeout(config.timeout()).context("Failed to build HTTP client")?;

    match &cli.command {
        Commands::Ask { question, target } => {
            if !ask(&tool, config, target, question).await? {
                return Err(eyre!("Invocation rejected"));
            }
        }
        Commands::Chat { target } => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if let Err(e) = ask(&tool, config, target, question).await {
                    eprintln!("{} {:#}", "Error:".red(), e);
                }
            }
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&tool.definition())?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
