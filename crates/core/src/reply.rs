//! Request-level value objects: who is asking, in which language, with
//! what intent, and what came back.

use serde::{Deserialize, Serialize};

/// Opaque key identifying the requester (the peer IP address in the gateway).
///
/// Sole partition key for sessions and rate-limit windows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two supported conversation languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Bahasa Indonesia
    Id,
    /// English
    #[default]
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// What the user is asking for; selects the task wording of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    ActionRequest,
    WhyQuestion,
    EmotionalStatement,
    ShortEmotion,
    General,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::ActionRequest => "ACTION_REQUEST",
            Intent::WhyQuestion => "WHY_QUESTION",
            Intent::EmotionalStatement => "EMOTIONAL_STATEMENT",
            Intent::ShortEmotion => "SHORT_EMOTION",
            Intent::General => "GENERAL",
        };
        f.write_str(s)
    }
}

/// Which terminal branch of the pipeline produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// Empty or whitespace-only message
    InvalidInput,
    /// Rejected by the rate limiter
    Throttled,
    /// Served from the response cache
    Cached,
    /// Crisis override
    Crisis,
    /// Accepted model output
    Generated,
    /// Canned empathetic reply after a failed or weak generation
    Fallback,
}

/// The outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    /// Detected language, when the pipeline got far enough to classify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl Reply {
    pub fn new(text: impl Into<String>, kind: ReplyKind, language: Option<Language>) -> Self {
        Self {
            text: text.into(),
            kind,
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_from_code() {
        let lang: Language = serde_json::from_str("\"id\"").unwrap();
        assert_eq!(lang, Language::Id);
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn intent_display_matches_tag() {
        assert_eq!(Intent::ActionRequest.to_string(), "ACTION_REQUEST");
        let json = serde_json::to_string(&Intent::ShortEmotion).unwrap();
        assert_eq!(json, "\"SHORT_EMOTION\"");
    }

    #[test]
    fn reply_omits_missing_language() {
        let reply = Reply::new("wait", ReplyKind::Throttled, None);
        let json = serde_json::to_string(&reply).unwrap();
        assert!(!json.contains("language"));
        assert!(json.contains("throttled"));
    }
}
