use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

const MAX_SLUG_LENGTH: usize = 50;
const FALLBACK_SLUG: &str = "conversation";

static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static SEPARATOR_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").unwrap());
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// The client's configuration directory, `~/.claude` unless overridden.
pub fn claude_directory(override_dir: Option<PathBuf>) -> Result<PathBuf> {
    match override_dir {
        Some(dir) => Ok(dir),
        None => {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            Ok(home.join(".claude"))
        }
    }
}

pub fn conversation_log(claude_dir: &Path, project_path: &str, session_id: &str) -> PathBuf {
    claude_dir
        .join("projects")
        .join(project_path)
        .join(format!("{session_id}.jsonl"))
}

pub fn default_transcripts_directory(claude_dir: &Path) -> PathBuf {
    claude_dir
        .join("skills")
        .join("save-conversation")
        .join("transcripts")
}

/// Lowercase, hyphen-separated form of `topic` that is safe to use in a filename.
pub fn slugify(topic: &str) -> String {
    let lowercase = topic.to_lowercase();
    let slug = DISALLOWED_CHARS.replace_all(&lowercase, "");
    let slug = SEPARATOR_RUNS.replace_all(&slug, "-");
    let slug = HYPHEN_RUNS.replace_all(&slug, "-");
    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_LENGTH).collect();

    if slug.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        slug
    }
}

/// First of `{date}-{slug}.md`, `{date}-{slug}-1.md`, ... that does not exist yet.
pub async fn available_output_path(dir: &Path, date: &str, slug: &str) -> Result<PathBuf> {
    let mut candidate = dir.join(format!("{date}-{slug}.md"));
    let mut counter = 1;

    while tokio::fs::try_exists(&candidate)
        .await
        .with_context(|| format!("Failed to check {}", candidate.display()))?
    {
        candidate = dir.join(format!("{date}-{slug}-{counter}.md"));
        counter += 1;
    }

    Ok(candidate)
}
