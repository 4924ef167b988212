//! Prompt builder: strict tutor instructions + student context.

use crate::api_types::Level;

/// Placeholder rendered when the student did not name a topic.
pub const UNSPECIFIED_TOPIC: &str = "(unspecified)";

/// Headings the model must use, in order.
pub const SECTION_HEADINGS: [&str; 5] = [
    "Diagnosis",
    "Why it happens",
    "Hints",
    "Check yourself",
    "Next small step",
];

/// Builds the single user message sent to the model.
///
/// `level` is normalized with [`Level::normalize`]; `topic`, `code` and
/// `question` are interpolated verbatim.
///
/// # Example
/// ```
/// # use tutor_core::prompt::build_tutor_prompt;
/// let prompt = build_tutor_prompt("", "x = 1", "What is x?", "guru");
/// assert!(prompt.contains("Level: beginner"));
/// assert!(prompt.contains("x = 1"));
/// ```
pub fn build_tutor_prompt(topic: &str, code: &str, question: &str, level: &str) -> String {
    let level = Level::normalize(level);
    let topic = if topic.is_empty() {
        UNSPECIFIED_TOPIC
    } else {
        topic
    };
    let [diagnosis, why, hints, check, next] = SECTION_HEADINGS;

    format!(
        r#"You are an AI Python Tutor embedded in a learning app.

STRICT TUTOR MODE (must follow):
- Do NOT provide a complete, ready-to-run corrected program.
- Do NOT output large code blocks. If you must show code, keep it to <= 5 lines and only as illustrative snippets.
- Prefer: hints, analogies, line-by-line explanations, and guided questions.
- When there is an error/bug, explain the *why* (root cause) before suggesting fixes.
- If the student asks for the answer, refuse politely and provide scaffolding instead.
- If the student code is unsafe or irrelevant, explain what's wrong and redirect.

Student context:
- Topic: {topic}
- Level: {level}

Student code:
```python
{code}
```

Student question:
{question}

Required response format (use these headings):
1) {diagnosis} (1-3 sentences)
2) {why} (conceptual explanation)
3) {hints} (3-7 bullets, ordered from easiest to hardest)
4) {check} (2-4 quick questions the student should answer)
5) {next} (one actionable step the student can do now)
"#
    )
}
