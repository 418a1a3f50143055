/*!
 * Journal entry content validation.
 *
 * Length and word-count bounds are errors; a short-but-valid entry or
 * concerning language only raises warnings.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Minimum trimmed length of an entry
pub const MIN_CHARS: usize = 10;

/// Maximum trimmed length of an entry
pub const MAX_CHARS: usize = 5000;

/// Minimum number of words
pub const MIN_WORDS: usize = 3;

/// Below this length the analysis tends to be shallow
pub const IDEAL_MIN_CHARS: usize = 50;

/// Run length of one repeated character that marks keyboard spam
const SPAM_REPEAT_RUN: usize = 11;

static CONCERNING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(suicide|kill myself|end it all|want to die)\b",
        r"(?i)\b(hurt myself|self harm|cutting)\b",
        r"(?i)\b(hopeless|worthless|useless)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid concerning content regex"))
    .collect()
});

static TEST_INPUT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^(test|testing|hello|hi|hey)$",
        r"^(a+|b+|c+|1+|2+|3+)$",
        r"^(qwerty|asdf|zxcv)$",
        r"^(lorem ipsum)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid test input regex"))
    .collect()
});

/// Outcome of validating an entry
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validation outcome plus live counters for an input field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub content: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Untrimmed character count
    pub char_count: usize,
    pub word_count: usize,
}

/// Color hint for the character counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterColor {
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharCountDisplay {
    pub count: usize,
    /// `count/5000`
    pub display: String,
    pub color: CounterColor,
}

/// Kind of message shown next to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Warning,
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Validate journal entry content
pub fn validate_journal_content(content: &str) -> ContentValidation {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return ContentValidation {
            is_valid: false,
            errors: vec!["Please share what's on your mind".to_string()],
            warnings: Vec::new(),
        };
    }

    let char_count = trimmed.chars().count();
    let words = word_count(trimmed);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if char_count < MIN_CHARS {
        errors.push(format!(
            "Please write at least {} characters (currently {})",
            MIN_CHARS, char_count
        ));
    }
    if char_count > MAX_CHARS {
        errors.push(format!(
            "Please keep your entry under {} characters (currently {})",
            MAX_CHARS, char_count
        ));
    }
    if words < MIN_WORDS {
        errors.push(format!("Please write at least {} words (currently {})", MIN_WORDS, words));
    }

    if (MIN_CHARS..IDEAL_MIN_CHARS).contains(&char_count) {
        warnings.push("Consider writing a bit more for better AI analysis".to_string());
    }
    if has_concerning_content(content) {
        warnings.push("Please consider reaching out to a counselor or crisis helpline".to_string());
    }

    ContentValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Whether the text mentions self-harm or hopelessness
pub fn has_concerning_content(content: &str) -> bool {
    CONCERNING_PATTERNS.iter().any(|p| p.is_match(content))
}

/// Validation plus counters, for live feedback while typing
pub fn form_state(content: &str) -> FormState {
    let validation = validate_journal_content(content);

    FormState {
        content: content.to_string(),
        is_valid: validation.is_valid,
        errors: validation.errors,
        warnings: validation.warnings,
        char_count: content.chars().count(),
        word_count: word_count(content),
    }
}

/// Prefix a message with its marker glyph
pub fn format_validation_message(kind: MessageKind, message: &str) -> String {
    let prefix = match kind {
        MessageKind::Error => "⚠️",
        MessageKind::Warning => "💡",
    };
    format!("{} {}", prefix, message)
}

/// Whether the content looks like test input or keyboard mashing
pub fn is_likely_spam(content: &str) -> bool {
    let normalized = content.trim().to_lowercase();

    if has_repeated_run(&normalized, SPAM_REPEAT_RUN) {
        return true;
    }

    TEST_INPUT_PATTERNS.iter().any(|p| p.is_match(&normalized))
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whether some character other than a line break repeats `run` or more times in a row
fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut previous = None;
    let mut length = 0;

    for c in text.chars() {
        if is_line_terminator(c) {
            previous = None;
            length = 0;
            continue;
        }
        if Some(c) == previous {
            length += 1;
        } else {
            previous = Some(c);
            length = 1;
        }
        if length >= run {
            return true;
        }
    }

    false
}

/// Trim and collapse every whitespace run to a single space
pub fn sanitize_content(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn char_count_display(content: &str) -> CharCountDisplay {
    let count = content.chars().count();
    let color = if count < MIN_CHARS {
        CounterColor::Yellow
    } else if count <= MAX_CHARS {
        CounterColor::Green
    } else {
        CounterColor::Red
    };

    CharCountDisplay {
        count,
        display: format!("{}/{}", count, MAX_CHARS),
        color,
    }
}
