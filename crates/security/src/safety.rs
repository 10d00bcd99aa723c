//! Crisis override: detects self-harm language before anything else runs.
//!
//! Detection is a case-insensitive substring match against a fixed,
//! bilingual keyword list, after collapsing whitespace runs to one space.
//! The reply cache keys on the same whitespace-normalized text, so any text
//! that could hit a cached reply is screened in exactly the form it is
//! cached under. It never touches the network, so upstream latency can't
//! delay it.

use curhat_core::Language;

/// Outcome of a safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    Clear,
    CrisisDetected { keyword: String },
}

impl SafetyVerdict {
    pub fn is_crisis(&self) -> bool {
        matches!(self, SafetyVerdict::CrisisDetected { .. })
    }
}

const CRISIS_REPLY_ID: &str = "Aku sangat prihatin mendengar kamu merasa seperti ini. \
Kamu tidak sendirian, dan keselamatanmu adalah yang paling penting sekarang. \
Tolong segera hubungi layanan darurat 112 atau Layanan Kesehatan Jiwa SEJIWA di 119 ext. 8, \
dan minta orang yang kamu percaya untuk menemanimu saat ini.";

const CRISIS_REPLY_EN: &str = "I'm really sorry you're feeling this way. \
You are not alone, and your safety matters most right now. \
Please contact a crisis line immediately: call or text 988 (Suicide & Crisis Lifeline) \
or your local emergency number, or find a helpline near you at https://findahelpline.com. \
If you can, ask someone you trust to stay with you.";

/// Crisis keyword detector with a fixed override reply.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    keywords: Vec<String>,
}

impl SafetyGate {
    /// Keywords are normalized once here; blank entries are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn check(&self, utterance: &str) -> SafetyVerdict {
        let normalized = normalize(utterance);
        match self.keywords.iter().find(|k| normalized.contains(k.as_str())) {
            Some(keyword) => SafetyVerdict::CrisisDetected {
                keyword: keyword.clone(),
            },
            None => SafetyVerdict::Clear,
        }
    }

    /// The fixed safety message, with a hotline reference.
    pub fn crisis_reply(language: Language) -> &'static str {
        match language {
            Language::Id => CRISIS_REPLY_ID,
            Language::En => CRISIS_REPLY_EN,
        }
    }
}

/// Lowercase, with every whitespace run (tabs, newlines, non-breaking
/// spaces) collapsed to a single space.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
