pub(crate) mod answers;
pub(crate) mod extract;
pub(crate) mod noise;
pub(crate) mod record;

use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Ordered turns of one session, plus the session slug if any record carried one.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub turns: Vec<Turn>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub tool_names: Vec<String>,
    /// Raw answer blocks, each holding one or more `"question"="response"` pairs.
    pub answers: Vec<String>,
    pub timestamp: Option<String>,
}
