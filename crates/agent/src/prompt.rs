//! Prompt composition for the main generation call.
//!
//! [`PromptComposer::compose`] is a pure function of its input. Every
//! context block (facts, knowledge, previous reply) is always rendered, even
//! when empty, so the model always sees the same instruction layout.

use curhat_core::{Intent, Language};

/// Everything the composer needs for one prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub utterance: &'a str,
    pub facts: &'a str,
    pub knowledge: &'a str,
    pub intent: Intent,
    pub language: Language,
    pub last_reply: &'a str,
}

/// Language-specific wording of the prompt.
struct Template {
    preamble: &'static str,
    action: &'static str,
    why: &'static str,
    emotion: &'static str,
    general: &'static str,
    facts_label: &'static str,
    knowledge_label: &'static str,
    last_reply_label: &'static str,
    no_repeat: &'static str,
}

const ID: Template = Template {
    preamble: "Kamu adalah AI konselor psikologi yang cerdas dan kontekstual.
Berikan jawaban yang:
- Sesuai konteks pertanyaan
- Tidak mengulang template
- Gunakan bahasa Indonesia yang natural.",
    action: "Tugas: pengguna bertanya apa yang harus dilakukan. Berikan dua atau tiga langkah \
konkret dan realistis yang bisa diambil, berdasarkan fakta dan referensi di bawah.",
    why: "Tugas: pengguna bertanya mengapa hal ini terjadi. Jelaskan kemungkinan penyebabnya \
dengan lembut, gunakan referensi bila membantu, tanpa menyalahkan pengguna.",
    emotion: "Tugas: pengguna sedang mengungkapkan perasaan. Akui perasaan itu secara spesifik \
dan ajak pengguna bercerita lebih lanjut. Jangan terburu-buru memberi saran.",
    general: "Tugas: tanggapi pesan pengguna dengan natural, hangat, dan relevan.",
    facts_label: "Fakta tentang pengguna:",
    knowledge_label: "Referensi:",
    last_reply_label: "Balasan kamu sebelumnya:",
    no_repeat: "Jangan gunakan kembali struktur, kalimat pembuka, atau susunan kalimat dari \
balasan kamu sebelumnya. Isi faktanya boleh tetap sama.",
};

const EN: Template = Template {
    preamble: "You are an intelligent, contextual psychology counselor AI.
Provide answers that:
- Fit the context of the question
- Do not repeat templates
- Use the same language as the user.",
    action: "Task: the user is asking what to do. Offer two or three concrete, realistic steps \
they can take, grounded in the facts and reference material below.",
    why: "Task: the user is asking why this is happening. Explain the likely reasons gently, \
using the reference material where it helps, without blaming the user.",
    emotion: "Task: the user is sharing a feeling. Acknowledge it specifically and invite them \
to say more. Do not rush into advice.",
    general: "Task: respond to the user's message naturally, warmly, and to the point.",
    facts_label: "Facts about the user:",
    knowledge_label: "Reference material:",
    last_reply_label: "Your previous reply:",
    no_repeat: "Do not reuse the structure, opening sentence, or phrasing of your previous \
reply. Its factual content may stay the same.",
};

fn template(language: Language) -> &'static Template {
    match language {
        Language::Id => &ID,
        Language::En => &EN,
    }
}

/// Builds the final generation prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, input: &PromptInput<'_>) -> String {
        let t = template(input.language);
        let task = match input.intent {
            Intent::ActionRequest => t.action,
            Intent::WhyQuestion => t.why,
            Intent::EmotionalStatement | Intent::ShortEmotion => t.emotion,
            Intent::General => t.general,
        };

        format!(
            "{preamble}\n\n{task}\n\n\
             {facts_label}\n{facts}\n\n\
             {knowledge_label}\n{knowledge}\n\n\
             {last_reply_label}\n{last_reply}\n\n\
             {no_repeat}\n\n\
             User: {utterance}\nAI:",
            preamble = t.preamble,
            facts_label = t.facts_label,
            facts = input.facts.trim(),
            knowledge_label = t.knowledge_label,
            knowledge = input.knowledge.trim(),
            last_reply_label = t.last_reply_label,
            last_reply = input.last_reply.trim(),
            no_repeat = t.no_repeat,
            utterance = input.utterance.trim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(intent: Intent, language: Language) -> PromptInput<'a> {
        PromptInput {
            utterance: "Aku harus apa?",
            facts: "User feels betrayed by a close friend.",
            knowledge: "Betrayal damages trust.",
            intent,
            language,
            last_reply: "Aku mengerti perasaanmu.",
        }
    }

    #[test]
    fn compose_is_pure() {
        let composer = PromptComposer::new();
        let i = input(Intent::ActionRequest, Language::Id);
        assert_eq!(composer.compose(&i), composer.compose(&i));
    }

    #[test]
    fn embeds_all_context_and_ends_with_user_turn() {
        let prompt = PromptComposer::new().compose(&input(Intent::ActionRequest, Language::Id));
        assert!(prompt.contains("User feels betrayed by a close friend."));
        assert!(prompt.contains("Betrayal damages trust."));
        assert!(prompt.contains("Aku mengerti perasaanmu."));
        assert!(prompt.contains("Jangan gunakan kembali struktur"));
        assert!(prompt.ends_with("User: Aku harus apa?\nAI:"));
    }

    #[test]
    fn empty_sections_keep_their_labels() {
        let i = PromptInput {
            utterance: "hi",
            facts: "",
            knowledge: "",
            intent: Intent::General,
            language: Language::En,
            last_reply: "",
        };
        let prompt = PromptComposer::new().compose(&i);
        assert!(prompt.contains("Facts about the user:\n\n"));
        assert!(prompt.contains("Reference material:\n\n"));
        assert!(prompt.contains("Your previous reply:\n\n"));
        assert!(prompt.contains("Do not reuse the structure"));
    }

    #[test]
    fn intent_selects_task_wording() {
        let composer = PromptComposer::new();
        let action = composer.compose(&input(Intent::ActionRequest, Language::En));
        let why = composer.compose(&input(Intent::WhyQuestion, Language::En));
        let emotion = composer.compose(&input(Intent::EmotionalStatement, Language::En));
        let short = composer.compose(&input(Intent::ShortEmotion, Language::En));
        let general = composer.compose(&input(Intent::General, Language::En));

        assert!(action.contains("asking what to do"));
        assert!(why.contains("asking why"));
        assert!(emotion.contains("sharing a feeling"));
        assert_eq!(emotion, short);
        assert_ne!(general, action);
        assert_ne!(general, why);
        assert_ne!(general, emotion);
    }

    #[test]
    fn language_selects_template() {
        let composer = PromptComposer::new();
        let id = composer.compose(&input(Intent::General, Language::Id));
        let en = composer.compose(&input(Intent::General, Language::En));
        assert!(id.starts_with("Kamu adalah AI konselor psikologi"));
        assert!(en.starts_with("You are an intelligent, contextual psychology counselor AI."));
    }
}
