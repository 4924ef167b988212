use serde::Deserialize;

/// Request payload for `/ask-ai`. Every field is optional at the wire level;
/// `TutorRequest::new` decides what is actually required.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskAiRequest {
    /// Topic the student is studying.
    pub topic: Option<String>,
    /// Student code, verbatim.
    pub code: Option<String>,
    /// The student's question.
    pub question: Option<String>,
    /// `beginner` | `intermediate` | `advanced`; anything else means beginner.
    pub level: Option<String>,
}
