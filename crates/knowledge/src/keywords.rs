//! Facts → retrieval keywords.
//!
//! Fixed substring rules over the lowercased facts. Every matching rule
//! contributes its keywords; with no match the generic set is used.
//! Keywords are English because the reference sources are.

struct KeywordRule {
    triggers: &'static [&'static str],
    keywords: &'static [&'static str],
}

const RULES: &[KeywordRule] = &[
    // Betrayal
    KeywordRule {
        triggers: &["khianat", "selingkuh", "dibohongi", "betray", "cheat", "lied to"],
        keywords: &["betrayal", "trust", "infidelity", "deception"],
    },
    // Exhaustion
    KeywordRule {
        triggers: &["lelah", "capek", "letih", "burnout", "exhaust", "tired", "kurang tidur"],
        keywords: &["fatigue", "exhaustion", "burnout", "rest", "sleep"],
    },
    // Sadness
    KeywordRule {
        triggers: &["sedih", "menangis", "kesepian", "duka", "sad", "lonely", "grief", "cry"],
        keywords: &["sadness", "grief", "loneliness", "depression"],
    },
    // Anxiety and stress
    KeywordRule {
        triggers: &["cemas", "khawatir", "panik", "stres", "takut", "anxious", "anxiety", "panic", "stress", "worr"],
        keywords: &["anxiety", "stress", "worry", "relaxation"],
    },
    // Anger
    KeywordRule {
        triggers: &["marah", "kesal", "angry", "anger", "frustrat"],
        keywords: &["anger", "frustration", "regulation"],
    },
    // Confusion
    KeywordRule {
        triggers: &["bingung", "ragu", "confus", "uncertain", "unsure"],
        keywords: &["decision", "uncertainty", "problem-solving"],
    },
];

const GENERIC: &[&str] = &["emotion", "coping", "support", "resilience", "well-being"];

/// Keywords for `facts`, in rule order without duplicates. Never empty.
pub fn keywords_for(facts: &str) -> Vec<&'static str> {
    let lowered = facts.to_lowercase();
    let mut keywords: Vec<&'static str> = Vec::new();

    for rule in RULES {
        if rule.triggers.iter().any(|t| lowered.contains(t)) {
            for k in rule.keywords {
                if !keywords.contains(k) {
                    keywords.push(k);
                }
            }
        }
    }

    if keywords.is_empty() {
        keywords.extend_from_slice(GENERIC);
    }
    keywords
}
