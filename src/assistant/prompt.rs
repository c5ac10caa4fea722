//! Fixed Swedish instruction strings and the request composition.
//!
//! The persona and the instruction texts are constants; the only variable
//! part of any request is the subject material and, for free-form questions,
//! the learner's own words.

// ---------------------------------------------------------------------------
// System instruction
// ---------------------------------------------------------------------------

/// Persona attached to every request: a pedagogical, encouraging study
/// coach that always answers in Swedish.
pub const SYSTEM_INSTRUCTION: &str = "\
Du är en smart och pedagogisk studiecoach i appen 'Studiekompis'. \
Din uppgift är att hjälpa användaren att förstå sitt studiematerial. \
Var tydlig, uppmuntrande och svara alltid på svenska.";

// ---------------------------------------------------------------------------
// Fixed task instructions
// ---------------------------------------------------------------------------

pub const INSTRUCTION_CHAPTERS: &str = "Dela upp texten i tydliga kapitel med rubriker.";
pub const INSTRUCTION_QUIZ: &str = "Skapa ett prov med 5 frågor + facit.";
pub const INSTRUCTION_SUMMARY: &str = "Sammanfatta det viktigaste i punktform.";

// ---------------------------------------------------------------------------
// AssistantTask
// ---------------------------------------------------------------------------

/// One AI-driven study operation.
///
/// Each task maps to a fixed instruction, except [`Question`](Self::Question)
/// which carries the learner's literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantTask {
    /// Split the material into titled chapters.
    Chapters,
    /// Produce a five-question quiz with an answer key.
    Quiz,
    /// Summarize the material as bullet points.
    Summary,
    /// A free-form question about the material.
    Question(String),
}

impl AssistantTask {
    /// The instruction text sent to the model.
    pub fn instruction(&self) -> &str {
        match self {
            Self::Chapters => INSTRUCTION_CHAPTERS,
            Self::Quiz => INSTRUCTION_QUIZ,
            Self::Summary => INSTRUCTION_SUMMARY,
            Self::Question(q) => q,
        }
    }

    /// Swedish label shown next to the spinner while the task runs.
    pub fn busy_label(&self) -> &'static str {
        match self {
            Self::Chapters => "Analyserar struktur...",
            Self::Quiz => "Skapar prov...",
            Self::Summary => "Sammanfattar...",
            Self::Question(_) => "Tänker...",
        }
    }
}

/// Compose the single user part sent to the model: the entire subject
/// material verbatim, then the instruction.  No truncation, no chunking.
pub fn compose_request(instruction: &str, context: &str) -> String {
    format!("Studiematerial:\n{context}\n\nUppgift/Fråga: {instruction}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_is_swedish_and_encouraging() {
        assert!(SYSTEM_INSTRUCTION.contains("studiecoach"));
        assert!(SYSTEM_INSTRUCTION.contains("svara alltid på svenska"));
        assert!(SYSTEM_INSTRUCTION.contains("uppmuntrande"));
    }

    #[test]
    fn fixed_tasks_map_to_fixed_instructions() {
        assert_eq!(AssistantTask::Chapters.instruction(), INSTRUCTION_CHAPTERS);
        assert_eq!(AssistantTask::Quiz.instruction(), INSTRUCTION_QUIZ);
        assert_eq!(AssistantTask::Summary.instruction(), INSTRUCTION_SUMMARY);
    }

    #[test]
    fn question_uses_the_learners_literal_text() {
        let task = AssistantTask::Question("Vad är fotosyntes?".into());
        assert_eq!(task.instruction(), "Vad är fotosyntes?");
    }

    #[test]
    fn request_carries_the_full_context_verbatim() {
        let context = "sida 1\nsida 2";
        let composed = compose_request("Sammanfatta.", context);

        assert_eq!(
            composed,
            "Studiematerial:\nsida 1\nsida 2\n\nUppgift/Fråga: Sammanfatta."
        );
    }
}
