mod paths;
mod render;
mod transcript;

use anyhow::{Context, bail};
use chrono::Local;
use serde::Deserialize;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ASSISTANT_NAME: &str = "Claude";
const DEFAULT_TOPIC: &str = "conversation";

#[derive(Deserialize, Debug)]
struct Environment {
    claude_config_dir: Option<PathBuf>,
    transcripts_dir: Option<PathBuf>,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "conversation-log-to-markdown",
    about = "Export a Claude Code conversation log to markdown"
)]
struct Args {
    /// The session UUID
    #[structopt(long)]
    session_id: String,

    /// The encoded project folder name (e.g. -Users-me-src-app)
    #[structopt(long, allow_hyphen_values = true)]
    project_path: String,

    /// Topic for the title and filename (defaults to the session slug)
    #[structopt(long)]
    topic: Option<String>,

    /// Directory to write the markdown file into
    #[structopt(short, long)]
    output_dir: Option<PathBuf>,

    /// Path to an optional TOML configuration file
    #[structopt(short = "c", long)]
    config: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
struct Config {
    assistant_name: Option<String>,
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let environment = envy::from_env::<Environment>()?;
    let args = Args::from_args();

    let config: Config = match &args.config {
        Some(path) => toml::from_str(
            &tokio::fs::read_to_string(path)
                .await
                .context("Failed to read config file")?,
        )
        .context("Failed to parse config TOML")?,
        None => Config::default(),
    };

    let claude_dir = paths::claude_directory(environment.claude_config_dir)?;
    let log_path = paths::conversation_log(&claude_dir, &args.project_path, &args.session_id);

    if !tokio::fs::try_exists(&log_path).await.unwrap_or(false) {
        bail!("Conversation file not found: {}", log_path.display());
    }

    let log = tokio::fs::read_to_string(&log_path)
        .await
        .with_context(|| format!("Failed to read {}", log_path.display()))?;

    let conversation = transcript::extract::produce(&log);
    if conversation.turns.is_empty() {
        bail!("No conversation content found");
    }
    info!(turns = conversation.turns.len(), "Extracted conversation");

    let topic = args
        .topic
        .filter(|topic| !topic.is_empty())
        .or_else(|| conversation.slug.clone())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_owned());

    let now = Local::now();
    let document = render::Document {
        topic: &topic,
        session_id: &args.session_id,
        assistant_name: config
            .assistant_name
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_NAME),
    };
    let markdown = document.render(&conversation, now);

    let output_dir = args
        .output_dir
        .or(config.output_dir)
        .or(environment.transcripts_dir)
        .unwrap_or_else(|| paths::default_transcripts_directory(&claude_dir));
    tokio::fs::create_dir_all(&output_dir)
        .await
        .context("Failed to create transcripts directory")?;

    let output_path = paths::available_output_path(
        &output_dir,
        &now.format("%Y-%m-%d").to_string(),
        &paths::slugify(&topic),
    )
    .await?;

    tokio::fs::write(&output_path, markdown)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Saved: {}", output_path.display());
    println!("Turns: {}", conversation.turns.len());

    Ok(())
}
