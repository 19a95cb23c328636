use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    User,
    Assistant,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "type", default)]
    pub kind: RecordKind,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<Entry>),
    Unrecognized(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Part(Part),
    Text(String),
    Unrecognized(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text {
        #[serde(default)]
        text: String,
    },
    ToolUse {
        #[serde(default = "unknown_tool")]
        name: String,
    },
    ToolResult {
        #[serde(default)]
        content: Option<Content>,
    },
    Thinking,
    #[serde(other)]
    Other,
}

fn unknown_tool() -> String {
    "Unknown".to_owned()
}

impl Content {
    /// Plain text of the content: the string itself, or every text entry joined by newlines.
    pub fn text(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(entries) => itertools::join(entries.iter().filter_map(Entry::text), "\n"),
            Content::Unrecognized(_) => String::new(),
        }
    }
}

impl Entry {
    pub fn text(&self) -> Option<&str> {
        match self {
            Entry::Part(Part::Text { text }) | Entry::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Parses every non-blank line of `log`, skipping the ones that are not valid records.
pub fn read_records(log: &str) -> impl Iterator<Item = Record> + '_ {
    log.lines().enumerate().filter_map(|(index, line)| {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match serde_json::from_str::<Record>(line) {
            Ok(record) => Some(record),
            Err(error) => {
                debug!(line = index + 1, %error, "Skipping malformed record");
                None
            }
        }
    })
}
