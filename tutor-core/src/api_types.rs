//! Request types shared with the HTTP layer.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// Largest accepted `code` field, in characters.
pub const MAX_CODE_CHARS: usize = 80_000;

/// Student skill level used to tune explanations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// Case-insensitive match on the three known levels; anything else,
    /// including the empty string, is `Beginner`.
    ///
    /// ```
    /// use tutor_core::Level;
    /// assert_eq!(Level::normalize(" Advanced "), Level::Advanced);
    /// assert_eq!(Level::normalize("expert"), Level::Beginner);
    /// ```
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "intermediate" => Level::Intermediate,
            "advanced" => Level::Advanced,
            _ => Level::Beginner,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated tutoring request. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorRequest {
    topic: String,
    code: String,
    question: String,
    level: Level,
}

impl TutorRequest {
    /// Validates raw, optional fields as they arrive from a client.
    ///
    /// `topic` and `question` are trimmed, `code` is kept verbatim.
    ///
    /// # Errors
    /// - [`ValidationError::MissingQuestion`] if `question` is absent or blank
    /// - [`ValidationError::CodeTooLarge`] if `code` exceeds [`MAX_CODE_CHARS`]
    pub fn new(
        topic: Option<&str>,
        code: Option<&str>,
        question: Option<&str>,
        level: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let question = question.map(str::trim).unwrap_or_default();
        if question.is_empty() {
            return Err(ValidationError::MissingQuestion);
        }

        let code = code.unwrap_or_default();
        let chars = code.chars().count();
        if chars > MAX_CODE_CHARS {
            return Err(ValidationError::CodeTooLarge {
                chars,
                max: MAX_CODE_CHARS,
            });
        }

        Ok(Self {
            topic: topic.map(str::trim).unwrap_or_default().to_string(),
            code: code.to_string(),
            question: question.to_string(),
            level: level.map(Level::normalize).unwrap_or_default(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_trimming() {
        let r = TutorRequest::new(None, None, Some("  why?  "), None).unwrap();
        assert_eq!(r.question(), "why?");
        assert_eq!(r.topic(), "");
        assert_eq!(r.code(), "");
        assert_eq!(r.level(), Level::Beginner);
    }

    #[test]
    fn code_is_kept_verbatim() {
        let code = "  for i in range(3):\n      print(i)\n";
        let r = TutorRequest::new(Some(" loops "), Some(code), Some("q"), Some("INTERMEDIATE"))
            .unwrap();
        assert_eq!(r.code(), code);
        assert_eq!(r.topic(), "loops");
        assert_eq!(r.level(), Level::Intermediate);
    }

    #[test]
    fn blank_question_rejected() {
        assert_eq!(
            TutorRequest::new(None, None, Some("   "), None),
            Err(ValidationError::MissingQuestion)
        );
        assert_eq!(
            TutorRequest::new(Some("t"), None, None, None),
            Err(ValidationError::MissingQuestion)
        );
    }

    #[test]
    fn code_limit_counts_chars() {
        let at_limit = "é".repeat(MAX_CODE_CHARS);
        assert!(TutorRequest::new(None, Some(&at_limit), Some("q"), None).is_ok());

        let over = "x".repeat(MAX_CODE_CHARS + 1);
        assert!(matches!(
            TutorRequest::new(None, Some(&over), Some("q"), None),
            Err(ValidationError::CodeTooLarge { chars, .. }) if chars == MAX_CODE_CHARS + 1
        ));
    }

    #[test]
    fn unknown_levels_are_beginner() {
        for raw in ["", "  ", "INVALID_LEVEL", "pro", "beginner!"] {
            assert_eq!(Level::normalize(raw), Level::Beginner, "{raw:?}");
        }
    }
}
