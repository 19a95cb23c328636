use std::borrow::Cow;

use chrono::{DateTime, Local, NaiveDateTime};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::transcript::{Conversation, Role, Turn, answers};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const UNKNOWN_DATE: &str = "Unknown";
const SEPARATOR: &str = "---";
const FENCE_MARKERS: &[&str] = &["```", "~~~"];

/// Headings that still have room for one more level.
static DEMOTABLE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{2,5})(\s|$)").unwrap());

pub struct Document<'a> {
    pub topic: &'a str,
    pub session_id: &'a str,
    pub assistant_name: &'a str,
}

impl Document<'_> {
    /// Renders the whole document. `now` stands in for the date when the first turn has none.
    pub fn render(&self, conversation: &Conversation, now: DateTime<Local>) -> String {
        let first_timestamp = conversation
            .turns
            .first()
            .and_then(|turn| turn.timestamp.as_deref());

        let mut lines: Vec<Cow<str>> = vec![
            format!("# Conversation: {}", self.topic).into(),
            "".into(),
            format!("**Date:** {}", format_date(first_timestamp, now)).into(),
            format!("**Session:** {}", self.session_id).into(),
            "".into(),
            SEPARATOR.into(),
            "".into(),
        ];

        for turn in &conversation.turns {
            self.render_turn(turn, &mut lines);
        }

        lines.join("\n")
    }

    fn render_turn<'t>(&self, turn: &'t Turn, lines: &mut Vec<Cow<'t, str>>) {
        match turn.role {
            Role::User => {
                lines.push("## User".into());
                lines.push("".into());
                lines.push(turn.text.as_str().into());
            }
            Role::Assistant => {
                lines.push(format!("## {}", self.assistant_name).into());
                lines.push("".into());
                lines.push(shift_headings(&turn.text).into());
            }
        }
        lines.push("".into());

        for tool_name in &turn.tool_names {
            lines.push(format!("> Used tool: {tool_name}").into());
        }
        if !turn.tool_names.is_empty() {
            lines.push("".into());
        }

        for (question, response) in turn.answers.iter().flat_map(|block| answers::pairs(block)) {
            lines.push(format!("**{question}**").into());
            lines.push(response.into());
            lines.push("".into());
        }

        lines.push(SEPARATOR.into());
        lines.push("".into());
    }
}

fn format_date(timestamp: Option<&str>, now: DateTime<Local>) -> String {
    match timestamp.filter(|timestamp| !timestamp.is_empty()) {
        None => now.format(DATE_FORMAT).to_string(),
        Some(timestamp) => parse_timestamp(timestamp)
            .map(|time| time.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| UNKNOWN_DATE.to_owned()),
    }
}

/// Wall-clock time of an ISO-8601 timestamp, in the timestamp's own offset.
fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    let normalized = match timestamp.strip_suffix('Z') {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(timestamp),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .map(|time| time.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

/// Demotes headings by one level so they nest under the role headers.
///
/// `######` is already the deepest level and stays put. Fenced code is left alone.
pub fn shift_headings(text: &str) -> String {
    let mut open_fence: Option<&str> = None;
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            let marker = FENCE_MARKERS
                .iter()
                .copied()
                .find(|marker| trimmed.starts_with(marker));

            match (open_fence, marker) {
                (None, Some(marker)) => open_fence = Some(marker),
                (Some(open), Some(marker)) if open == marker => open_fence = None,
                (None, None) => return DEMOTABLE_HEADING.replace(line, "#${1}${2}"),
                _ => {}
            }
            Cow::Borrowed(line)
        })
        .join("\n")
}
