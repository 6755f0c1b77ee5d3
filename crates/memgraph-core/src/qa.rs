//! ============================================================================
//! Question Answering - translate -> filter -> format
//! ============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::answer::format_answer;
use crate::query::filter_triplets;
use crate::store::Snapshot;
use crate::translate::QuestionTranslator;
use crate::types::{AuthoredTriplet, Filter};

/// Everything produced while answering one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub filter: Filter,
    pub matches: Vec<AuthoredTriplet>,
    pub text: String,
}

/// Answer against an already-flattened collection
pub fn answer(triplets: &[AuthoredTriplet], translator: &QuestionTranslator, question: &str) -> Answer {
    let filter = translator.translate(question);
    let matches = filter_triplets(triplets, &filter);
    debug!("{} of {} triplets match {:?}", matches.len(), triplets.len(), filter);

    let text = format_answer(&matches, &filter);
    Answer {
        question: question.to_string(),
        filter,
        matches,
        text,
    }
}

/// Answer a question from the memory snapshot. Always yields a string.
pub fn ask(snapshot: &Snapshot, translator: &QuestionTranslator, question: &str) -> String {
    answer(&snapshot.flatten(), translator, question).text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::NO_INFORMATION_FOUND;
    use crate::types::{ReturnShape, Triplet};

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert_batch(
            "Ali",
            [Triplet::new("Ali", "recommend", "FastAPI").into_record("2024-05-01T10:00:00")],
        );
        snapshot.insert_batch(
            "Ayşe",
            [
                Triplet::new("Ayşe", "like", "Rust").into_record("2024-05-01T10:02:00"),
                Triplet::new("app", "use", "FastAPI").into_record("2024-05-01T10:05:00"),
            ],
        );
        snapshot
    }

    #[test]
    fn test_ask_who_said_what() {
        let translator = QuestionTranslator::default();
        assert_eq!(
            ask(&sample(), &translator, "Ayşe ne dedi?"),
            "Ayşe said: \"Ayşe like Rust\"\nAyşe said: \"app use FastAPI\""
        );
    }

    #[test]
    fn test_ask_who_recommends() {
        let translator = QuestionTranslator::default();
        assert_eq!(
            ask(&sample(), &translator, "Who recommends FastAPI?"),
            "FastAPI related action performed by: Ali"
        );
    }

    #[test]
    fn test_ask_nothing_matches() {
        let translator = QuestionTranslator::default();
        assert_eq!(ask(&sample(), &translator, "Erdem ne dedi?"), NO_INFORMATION_FOUND);
        assert_eq!(ask(&Snapshot::new(), &translator, "anything"), NO_INFORMATION_FOUND);
    }

    #[test]
    fn test_answer_exposes_filter_and_matches() {
        let translator = QuestionTranslator::default();
        let result = answer(&sample().flatten(), &translator, "Who likes Rust?");
        assert_eq!(result.filter.shape(), ReturnShape::Subject);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].author, "Ayşe");
    }
}
