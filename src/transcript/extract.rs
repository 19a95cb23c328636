use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use super::record::{Content, Entry, Part, Record, RecordKind, read_records};
use super::{Conversation, Role, Turn, answers, noise};

/// Builds the conversation from a raw `.jsonl` session log.
pub fn produce(log: &str) -> Conversation {
    let mut extractor = Extractor::default();
    for record in read_records(log) {
        extractor.push(record);
    }
    extractor.finish()
}

#[derive(Default)]
struct Extractor {
    turns: Vec<Turn>,
    seen: HashSet<String>,
    slug: Option<String>,
}

impl Extractor {
    fn push(&mut self, record: Record) {
        let Record {
            kind,
            message,
            timestamp,
            slug,
        } = record;

        if self.slug.is_none() {
            self.slug = slug.filter(|slug| !slug.is_empty());
        }

        let Some(content) = message.and_then(|message| message.content) else {
            return;
        };

        match kind {
            RecordKind::User => self.push_user(content, timestamp),
            RecordKind::Assistant => self.push_assistant(content, timestamp),
            RecordKind::Other => {}
        }
    }

    fn push_user(&mut self, content: Content, timestamp: Option<String>) {
        if let Content::Parts(entries) = &content {
            for entry in entries {
                if let Entry::Part(Part::ToolResult {
                    content: Some(result),
                }) = entry
                {
                    if let Some(block) = answers::capture_block(&result.text()) {
                        self.attach_answer(block.to_owned());
                    }
                }
            }
        }

        let Some(text) = user_text(&content) else {
            return;
        };

        self.push_turn(Role::User, noise::clean(&text), Vec::new(), timestamp);
    }

    fn push_assistant(&mut self, content: Content, timestamp: Option<String>) {
        let Content::Parts(entries) = content else {
            return;
        };

        let mut texts = Vec::new();
        let mut tool_names = Vec::new();
        for entry in entries {
            match entry {
                Entry::Part(Part::Text { text }) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        texts.push(text.to_owned());
                    }
                }
                Entry::Part(Part::ToolUse { name }) => tool_names.push(name),
                _ => {}
            }
        }

        if texts.is_empty() {
            if !tool_names.is_empty() {
                self.merge_tools(tool_names);
            }
            return;
        }

        self.push_turn(Role::Assistant, texts.join("\n\n"), tool_names, timestamp);
    }

    fn push_turn(
        &mut self,
        role: Role,
        text: String,
        tool_names: Vec<String>,
        timestamp: Option<String>,
    ) {
        if text.is_empty() {
            return;
        }
        if self.seen.contains(&text) {
            debug!(%role, "Dropping repeated message");
            return;
        }

        self.seen.insert(text.clone());
        self.turns.push(Turn {
            role,
            text,
            tool_names,
            answers: Vec::new(),
            timestamp,
        });
    }

    fn last_assistant_turn(&mut self) -> Option<&mut Turn> {
        self.turns
            .last_mut()
            .filter(|turn| turn.role == Role::Assistant)
    }

    fn merge_tools(&mut self, tool_names: Vec<String>) {
        match self.last_assistant_turn() {
            Some(turn) => turn.tool_names.extend(tool_names),
            None => debug!(?tool_names, "No assistant turn to attach tool calls to"),
        }
    }

    fn attach_answer(&mut self, block: String) {
        match self.last_assistant_turn() {
            Some(turn) => turn.answers.push(block),
            None => debug!("No assistant turn to attach answers to"),
        }
    }

    fn finish(self) -> Conversation {
        Conversation {
            turns: self.turns,
            slug: self.slug,
        }
    }
}

/// User-authored text of a message, ignoring tool results and noise.
fn user_text(content: &Content) -> Option<String> {
    let text = match content {
        Content::Text(text) => text.clone(),
        Content::Parts(entries) => entries
            .iter()
            .filter_map(Entry::text)
            .filter(|text| !noise::is_noise(text))
            .join("\n"),
        Content::Unrecognized(_) => return None,
    };

    (!noise::is_noise(&text)).then_some(text)
}
