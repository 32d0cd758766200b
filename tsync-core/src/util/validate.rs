use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const MAX_CONTENT_LEN: usize = 500;

// A substring of at least this many characters ...
const SPAM_MIN_PATTERN_LEN: usize = 3;
// ... repeated this many times in a row is considered spam.
const SPAM_MIN_REPETITIONS: usize = 5;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref EVENT_HANDLER: Regex =
        Regex::new(r#"(?i)\bon[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#).unwrap();
    static ref SCRIPT_PROTOCOL: Regex =
        Regex::new(r"(?i)\b(?:(?:javascript|vbscript)\s*:|data:[a-z]+/[a-z0-9.+-]+)").unwrap();
    static ref EXCESS_LINE_BREAKS: Regex = Regex::new(r"\n{3,}").unwrap();
    static ref UNSAFE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("document.cookie", Regex::new(r"(?i)document\s*\.\s*cookie").unwrap()),
        ("document.write", Regex::new(r"(?i)document\s*\.\s*write").unwrap()),
        ("window.location", Regex::new(r"(?i)window\s*\.\s*location").unwrap()),
        ("eval(", Regex::new(r"(?i)\beval\s*\(").unwrap()),
        ("expression(", Regex::new(r"(?i)\bexpression\s*\(").unwrap()),
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentInvalidation {
    #[error("The comment is empty")]
    Empty,
    #[error("The comment is too long ({len} > {max} characters)")]
    TooLong { len: usize, max: usize },
    #[error("The comment contains an unsafe pattern ({0})")]
    UnsafePattern(&'static str),
    #[error("The comment looks like spam")]
    Repetitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentInvalidation {
    #[error("Missing discussion context")]
    MissingContext,
    #[error("Invalid content: {0:?}")]
    Content(Vec<ContentInvalidation>),
}

impl From<Vec<ContentInvalidation>> for CommentInvalidation {
    fn from(from: Vec<ContentInvalidation>) -> Self {
        Self::Content(from)
    }
}

/// Result of validating raw comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentValidation {
    pub is_valid: bool,
    pub errors: Vec<ContentInvalidation>,
    pub sanitized: String,
}

impl ContentValidation {
    pub fn into_result(self) -> Result<String, Vec<ContentInvalidation>> {
        if self.is_valid {
            Ok(self.sanitized)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentValidator {
    max_len: usize,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self {
            max_len: MAX_CONTENT_LEN,
        }
    }
}

impl ContentValidator {
    pub const fn with_max_len(max_len: usize) -> Self {
        Self { max_len }
    }

    /// All checks operate on the plain text as typed, before escaping.
    pub fn validate(&self, content: &str) -> ContentValidation {
        let text = strip(content);
        let mut errors = vec![];
        let len = text.chars().count();
        if len == 0 {
            errors.push(ContentInvalidation::Empty);
        }
        if len > self.max_len {
            errors.push(ContentInvalidation::TooLong {
                len,
                max: self.max_len,
            });
        }
        if let Some(pattern) = find_unsafe_pattern(&text) {
            errors.push(ContentInvalidation::UnsafePattern(pattern));
        }
        // The check is quadratic, so oversized input is not inspected.
        if len <= self.max_len && is_repetitive(&text) {
            errors.push(ContentInvalidation::Repetitive);
        }
        ContentValidation {
            is_valid: errors.is_empty(),
            errors,
            sanitized: escape_html(&text),
        }
    }
}

pub fn sanitize(content: &str) -> String {
    escape_html(&strip(content))
}

/// Removes markup and normalizes line breaks without escaping.
fn strip(content: &str) -> String {
    let text = HTML_TAG.replace_all(content, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    let text = SCRIPT_PROTOCOL.replace_all(&text, "");
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = EXCESS_LINE_BREAKS.replace_all(&text, "\n\n");
    text.trim().to_owned()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn find_unsafe_pattern(text: &str) -> Option<&'static str> {
    UNSAFE_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
}

/// Detects a substring of at least [`SPAM_MIN_PATTERN_LEN`] characters that
/// is repeated [`SPAM_MIN_REPETITIONS`] or more times back to back.
///
/// For a fixed period `p` the text contains such a run iff there are
/// `(SPAM_MIN_REPETITIONS - 1) * p` consecutive positions `i` with
/// `chars[i] == chars[i + p]`.
fn is_repetitive(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    for period in SPAM_MIN_PATTERN_LEN..=n / SPAM_MIN_REPETITIONS {
        let required = (SPAM_MIN_REPETITIONS - 1) * period;
        let mut run = 0;
        for i in 0..n - period {
            if chars[i] == chars[i + period] {
                run += 1;
                if run >= required {
                    return true;
                }
            } else {
                run = 0;
            }
        }
    }
    false
}
