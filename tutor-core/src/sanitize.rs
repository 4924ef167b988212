//! Output guardrail: keep answers as hints, not solution dumps.
//!
//! Two passes, in order:
//! 1. Fenced code blocks longer than [`MAX_CODE_BLOCK_LINES`] are replaced
//!    with [`CODE_OMITTED_NOTICE`].
//! 2. If the remaining text has at least [`SUSPICIOUS_LINE_THRESHOLD`] lines
//!    that open like program structure (`import `, `def `, ...), it is cut to
//!    [`MAX_OUTPUT_LINES`] lines and [`TRUNCATED_NOTICE`] is appended.
//!
//! This is a heuristic. It guarantees the threshold behavior above and
//! nothing more.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

// Line counts use `str::lines`: `\n` and `\r\n` end a line; a lone `\r`,
// form feed, or U+2028/U+2029 does not.
pub const MAX_CODE_BLOCK_LINES: usize = 8;
pub const SUSPICIOUS_LINE_THRESHOLD: usize = 12;
pub const MAX_OUTPUT_LINES: usize = 120;

pub const CODE_OMITTED_NOTICE: &str = "[Code omitted to keep this tutor-focused. \
Ask for a hint about a specific line or error message, and I'll guide you.]";

pub const TRUNCATED_NOTICE: &str = "[Output truncated to avoid full-solution code.]";

/// Line openers typical of a full program rather than a hint.
pub const SUSPICIOUS_LINE_STARTS: [&str; 5] = ["import ", "from ", "def ", "class ", "if __name__"];

/// ```` ```lang\n<body>``` ```` with an optional language tag.
static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:[\w+-]+)?\n(.*?)```").expect("valid code fence regex"));

/// Applies both guardrail passes. Empty input is returned untouched.
///
/// ```
/// use tutor_core::sanitize::sanitize;
/// assert_eq!(sanitize(""), "");
/// assert_eq!(sanitize("Try printing i."), "Try printing i.");
/// ```
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }
    let redacted = redact_long_code_blocks(text);
    match truncate_solution_dump(&redacted) {
        Some(truncated) => Cow::Owned(truncated),
        None => redacted,
    }
}

/// Like [`sanitize`], but an absent value stays absent.
pub fn sanitize_opt(text: Option<&str>) -> Option<Cow<'_, str>> {
    text.map(sanitize)
}

fn redact_long_code_blocks(text: &str) -> Cow<'_, str> {
    CODE_FENCE_RE.replace_all(text, |caps: &Captures| {
        let body = caps.get(1).map_or("", |m| m.as_str());
        if body.lines().count() > MAX_CODE_BLOCK_LINES {
            CODE_OMITTED_NOTICE.to_string()
        } else {
            caps[0].to_string()
        }
    })
}

/// `Some(truncated)` when the text looks like an unfenced solution dump.
fn truncate_solution_dump(text: &str) -> Option<String> {
    let suspicious = text
        .lines()
        .filter(|line| {
            let line = line.trim_start();
            SUSPICIOUS_LINE_STARTS.iter().any(|p| line.starts_with(p))
        })
        .count();

    if suspicious < SUSPICIOUS_LINE_THRESHOLD {
        return None;
    }

    let kept: Vec<&str> = text.lines().take(MAX_OUTPUT_LINES).collect();
    Some(format!("{}\n\n{TRUNCATED_NOTICE}", kept.join("\n")))
}
