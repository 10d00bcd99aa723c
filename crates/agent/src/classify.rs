//! Lexical classifiers for language and intent.
//!
//! Both are cheap rule chains over the lowercased, tokenized message. They
//! only select a prompt template and a fallback string, so an occasional
//! misclassification is harmless.

use curhat_core::{Intent, Language};

/// Common Indonesian function words and fillers.
const ID_CUES: &[&str] = &[
    "aku", "saya", "kamu", "yang", "dan", "tidak", "nggak", "gak", "ini", "itu", "dengan",
    "untuk", "apa", "kenapa", "mengapa", "ada", "sudah", "udah", "belum", "juga", "karena",
    "gimana", "bagaimana", "banget", "lagi", "merasa", "sangat", "di", "ke", "dari", "ingin",
    "mau", "sama", "tapi", "harus", "bisa", "aja", "kok", "dia", "mereka", "rasanya",
];

/// Common English function words.
const EN_CUES: &[&str] = &[
    "i", "i'm", "im", "you", "the", "and", "is", "am", "are", "was", "to", "of", "my", "me",
    "what", "why", "how", "feel", "feeling", "not", "it", "this", "that", "with", "do", "so",
    "just", "have", "can", "should", "but", "because", "really", "want", "he", "she", "they",
];

/// Split into lowercase word tokens. Apostrophes stay inside a word.
fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Picks Indonesian or English by counting cue words.
///
/// Ties (including no cues at all) go to the configured default.
#[derive(Debug, Clone, Copy)]
pub struct LanguageClassifier {
    default: Language,
}

impl LanguageClassifier {
    pub fn new(default: Language) -> Self {
        Self { default }
    }

    pub fn classify(&self, text: &str) -> Language {
        let tokens = tokens(text);
        let id = tokens.iter().filter(|t| ID_CUES.contains(&t.as_str())).count();
        let en = tokens.iter().filter(|t| EN_CUES.contains(&t.as_str())).count();

        match id.cmp(&en) {
            std::cmp::Ordering::Greater => Language::Id,
            std::cmp::Ordering::Less => Language::En,
            std::cmp::Ordering::Equal => self.default,
        }
    }
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

const ACTION_PHRASES: &[&str] = &[
    "what should i do",
    "what do i do",
    "what can i do",
    "what should i",
    "how do i",
    "how can i",
    "should i",
    "apa yang harus",
    "apa yang sebaiknya",
    "harus apa",
    "harus bagaimana",
    "harus gimana",
    "gimana caranya",
    "bagaimana caranya",
    "sebaiknya aku",
    "sebaiknya saya",
];

const WHY_WORDS: &[&str] = &["why", "kenapa", "mengapa", "napa", "kok bisa"];

const EMOTION_WORDS: &[&str] = &[
    "tired", "exhausted", "sad", "confused", "betrayed", "stressed", "stress", "anxious",
    "lonely", "angry", "hurt", "depressed", "overwhelmed", "lelah", "capek", "cape", "letih",
    "sedih", "bingung", "dikhianati", "khianat", "stres", "cemas", "kesepian", "marah",
    "kecewa", "galau", "takut",
];

/// Messages of at most this many tokens count as a short emotion.
const SHORT_MESSAGE_TOKENS: usize = 4;

/// Ordered rule chain; the first matching rule decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> Intent {
        let tokens = tokens(text);
        // Padded so phrases only match on word boundaries
        let padded = format!(" {} ", tokens.join(" "));
        let has = |phrase: &&str| padded.contains(&format!(" {phrase} "));

        if ACTION_PHRASES.iter().any(has) {
            Intent::ActionRequest
        } else if WHY_WORDS.iter().any(has) {
            Intent::WhyQuestion
        } else if tokens.len() <= SHORT_MESSAGE_TOKENS {
            Intent::ShortEmotion
        } else if EMOTION_WORDS.iter().any(has) {
            Intent::EmotionalStatement
        } else {
            Intent::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indonesian_cues_win() {
        let c = LanguageClassifier::new(Language::En);
        assert_eq!(c.classify("aku ingin mati"), Language::Id);
        assert_eq!(c.classify("Aku capek banget sama kerjaan"), Language::Id);
    }

    #[test]
    fn english_cues_win() {
        let c = LanguageClassifier::new(Language::Id);
        assert_eq!(c.classify("I feel so tired of this job"), Language::En);
    }

    #[test]
    fn no_cues_use_default() {
        assert_eq!(LanguageClassifier::new(Language::Id).classify("hmm..."), Language::Id);
        assert_eq!(LanguageClassifier::new(Language::En).classify("12345"), Language::En);
        assert_eq!(LanguageClassifier::default().classify(""), Language::En);
    }

    #[test]
    fn action_request_takes_precedence_over_why() {
        let c = IntentClassifier::new();
        assert_eq!(
            c.classify("Why is this happening and what should I do now?"),
            Intent::ActionRequest
        );
        assert_eq!(c.classify("Aku harus apa?"), Intent::ActionRequest);
        assert_eq!(
            c.classify("Gimana caranya biar aku bisa tidur nyenyak lagi"),
            Intent::ActionRequest
        );
    }

    #[test]
    fn why_question_before_short_threshold() {
        let c = IntentClassifier::new();
        assert_eq!(c.classify("kenapa?"), Intent::WhyQuestion);
        assert_eq!(
            c.classify("Why do I always feel this way after talking to him"),
            Intent::WhyQuestion
        );
    }

    #[test]
    fn short_messages_are_short_emotion() {
        let c = IntentClassifier::new();
        assert_eq!(c.classify("capek banget"), Intent::ShortEmotion);
        assert_eq!(c.classify("I am sad"), Intent::ShortEmotion);
        assert_eq!(c.classify("hello there"), Intent::ShortEmotion);
    }

    #[test]
    fn emotion_words_in_longer_messages() {
        let c = IntentClassifier::new();
        assert_eq!(
            c.classify("Aku merasa dikhianati oleh sahabatku sendiri"),
            Intent::EmotionalStatement
        );
        assert_eq!(
            c.classify("I have been really stressed at work this month"),
            Intent::EmotionalStatement
        );
    }

    #[test]
    fn everything_else_is_general() {
        let c = IntentClassifier::new();
        assert_eq!(
            c.classify("I moved to a new city last week for my job"),
            Intent::General
        );
    }

    #[test]
    fn phrases_match_whole_words_only() {
        let c = IntentClassifier::new();
        // "whyte" must not trigger the why rule
        assert_eq!(
            c.classify("My friend Whyte moved away to another country"),
            Intent::General
        );
    }
}
