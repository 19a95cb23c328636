use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

/// Wrappers whose contents never carry anything the user typed.
const SYSTEM_TAGS: &[&str] = &[
    "local-command-caveat",
    "command-name",
    "command-message",
    "command-args",
    "local-command-stdout",
    "system-reminder",
];

/// Wrappers stripped from user text that is otherwise kept.
const STRIPPED_TAGS: &[&str] = &["system-reminder", "local-command-caveat"];

const SKILL_PREAMBLE: &str = "Base directory for this skill:";

static WHOLE_STRING_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\s*$").unwrap(),
        Regex::new(&format!(r"^\s*{}", regex::escape(SKILL_PREAMBLE))).unwrap(),
    ]
});

static SYSTEM_TAG_SPANS: Lazy<Regex> = Lazy::new(|| span_regex(SYSTEM_TAGS));

static STRIPPED_TAG_SPANS: Lazy<Regex> = Lazy::new(|| span_regex(STRIPPED_TAGS));

/// Matches `<tag>...</tag>` for any of `tags`, shortest span first, across lines.
fn span_regex(tags: &[&str]) -> Regex {
    let alternatives = tags
        .iter()
        .map(|tag| format!("<{0}>.*?</{0}>", regex::escape(tag)))
        .join("|");
    Regex::new(&format!("(?s){alternatives}")).unwrap()
}

pub fn is_noise(text: &str) -> bool {
    if WHOLE_STRING_NOISE.iter().any(|pattern| pattern.is_match(text)) {
        return true;
    }

    SYSTEM_TAG_SPANS.replace_all(text, "").trim().is_empty()
}

/// Removes reminder and caveat spans and trims what is left.
pub fn clean(text: &str) -> String {
    STRIPPED_TAG_SPANS.replace_all(text, "").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_noise() {
        assert!(is_noise(""));
        assert!(is_noise("  \n\t "));
    }

    #[test]
    fn lone_system_reminder_is_noise() {
        assert!(is_noise(
            "<system-reminder>\nThe user opened a file.\n</system-reminder>"
        ));
    }

    #[test]
    fn command_echo_is_noise() {
        let echo = "<command-name>/clear</command-name>\n            <command-message>clear</command-message>\n            <command-args></command-args>";
        assert!(is_noise(echo));
    }

    #[test]
    fn caveat_and_stdout_are_noise() {
        assert!(is_noise(
            "<local-command-caveat>Caveat: generated by a local command.</local-command-caveat>"
        ));
        assert!(is_noise("<local-command-stdout>ok</local-command-stdout>"));
    }

    #[test]
    fn skill_preamble_is_noise() {
        assert!(is_noise(
            "Base directory for this skill: /home/me/.claude/skills/save\n\n# Save conversation"
        ));
    }

    #[test]
    fn text_around_tags_is_not_noise() {
        assert!(!is_noise(
            "<system-reminder>reminder</system-reminder>\nPlease fix the build"
        ));
        assert!(!is_noise("Hello"));
    }

    #[test]
    fn mismatched_tags_are_not_stripped() {
        assert!(!is_noise("<command-name>/clear</command-args>"));
    }

    #[test]
    fn clean_strips_reminders_and_caveats_only() {
        let text = "  <system-reminder>a\nb</system-reminder>Fix it <local-command-caveat>c</local-command-caveat>\n<command-name>/x</command-name> ";
        assert_eq!(clean(text), "Fix it \n<command-name>/x</command-name>");
    }

    #[test]
    fn clean_is_non_greedy() {
        let text = "<system-reminder>a</system-reminder>keep<system-reminder>b</system-reminder>";
        assert_eq!(clean(text), "keep");
    }
}
