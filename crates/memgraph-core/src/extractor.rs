//! ============================================================================
//! Triplet Extractor - Sentences in, (subject, predicate, object) out
//! ============================================================================
//! One pass per sentence over the parser's tokens:
//! - nsubj / nsubjpass          -> subject candidate
//! - dobj / pobj / attr         -> object candidate
//! - token governed by a VERB   -> predicate candidate (the verb's lemma)
//!
//! Later candidates overwrite earlier ones, so a sentence with two clauses
//! yields at most one triplet built from the last subject, object and verb.
//! ============================================================================

use tracing::{debug, trace};

use crate::parser::{ParsedSentence, PartOfSpeech, RuleParser, SentenceParser};
use crate::types::{AuthoredTriplet, ChatMessage, Triplet};

/// Candidate fields collected while scanning one sentence
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TripletCandidate {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl TripletCandidate {
    /// Scan a parsed sentence, keeping the last candidate of each kind
    pub fn scan(sentence: &ParsedSentence) -> Self {
        let mut candidate = Self::default();

        for (index, token) in sentence.tokens.iter().enumerate() {
            if token.dep.is_subject() {
                candidate.subject = token.text.clone();
            }
            if token.dep.is_object() {
                candidate.object = token.text.clone();
            }
            if let Some(head) = sentence.governor(index) {
                if head.pos == PartOfSpeech::Verb {
                    candidate.predicate = head.lemma.clone();
                }
            }
        }

        candidate
    }

    /// Completeness policy: all three fields must be non-empty
    pub fn into_triplet(self) -> Option<Triplet> {
        if self.subject.is_empty() || self.predicate.is_empty() || self.object.is_empty() {
            return None;
        }
        Some(Triplet::new(self.subject, self.predicate, self.object))
    }
}

/// Stateless extractor over any [`SentenceParser`]
#[derive(Debug, Clone, Default)]
pub struct TripletExtractor<P = RuleParser> {
    parser: P,
}

impl TripletExtractor<RuleParser> {
    /// Extractor backed by the built-in rule parser
    pub fn new() -> Self {
        Self::with_parser(RuleParser::new())
    }
}

impl<P: SentenceParser> TripletExtractor<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Extract zero or more triplets. Never fails; unusable input just
    /// produces fewer triplets.
    pub fn extract(&self, text: &str) -> Vec<Triplet> {
        let triplets: Vec<Triplet> = self
            .parser
            .parse(text)
            .iter()
            .filter_map(|sentence| {
                let candidate = TripletCandidate::scan(sentence);
                let triplet = candidate.clone().into_triplet();
                if triplet.is_none() {
                    trace!("Dropped incomplete triplet {:?} from {:?}", candidate, sentence.text);
                }
                triplet
            })
            .collect();

        debug!("Extracted {} triplets from {} bytes of text", triplets.len(), text.len());
        triplets
    }

    /// Extract from chat messages, attaching each message's sender and timestamp
    pub fn extract_messages(&self, messages: &[ChatMessage]) -> Vec<AuthoredTriplet> {
        messages
            .iter()
            .flat_map(|message| {
                self.extract(&message.text).into_iter().map(move |triplet| {
                    AuthoredTriplet::new(
                        message.sender.clone(),
                        triplet.into_record(message.timestamp.clone()),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{DepRole, Token};
    use crate::types::Fact;

    /// Parser that returns canned sentences regardless of input
    struct FixedParser(Vec<ParsedSentence>);

    impl SentenceParser for FixedParser {
        fn parse(&self, _text: &str) -> Vec<ParsedSentence> {
            self.0.clone()
        }
    }

    fn token(text: &str, lemma: &str, pos: PartOfSpeech, dep: DepRole, head: usize) -> Token {
        Token {
            text: text.to_string(),
            lemma: lemma.to_string(),
            pos,
            dep,
            head,
        }
    }

    #[test]
    fn test_recommendation_sentence() {
        let extractor = TripletExtractor::new();
        assert_eq!(
            extractor.extract("Ali recommends FastAPI."),
            vec![Triplet::new("Ali", "recommend", "FastAPI")]
        );
    }

    #[test]
    fn test_multiple_sentences() {
        let extractor = TripletExtractor::new();
        let triplets = extractor.extract("Ayşe likes Rust. Erdem built a memory system. The memory system stores triplets.");
        assert_eq!(
            triplets,
            vec![
                Triplet::new("Ayşe", "like", "Rust"),
                Triplet::new("Erdem", "build", "system"),
                Triplet::new("system", "store", "triplets"),
            ]
        );
    }

    #[test]
    fn test_last_candidate_wins_across_clauses() {
        let extractor = TripletExtractor::new();
        assert_eq!(
            extractor.extract("Ali likes Rust and Ayşe loves Go."),
            vec![Triplet::new("Ayşe", "love", "Go")]
        );
    }

    #[test]
    fn test_prepositional_object_and_passive() {
        let extractor = TripletExtractor::new();
        assert_eq!(
            extractor.extract("Ali talked about FastAPI."),
            vec![Triplet::new("Ali", "talk", "FastAPI")]
        );
        assert_eq!(
            extractor.extract("The app was built by Erdem."),
            vec![Triplet::new("app", "build", "Erdem")]
        );
    }

    #[test]
    fn test_copula_has_no_verb_head() {
        let extractor = TripletExtractor::new();
        assert!(extractor.extract("Ali is a developer.").is_empty());
    }

    #[test]
    fn test_incomplete_sentences_dropped() {
        let extractor = TripletExtractor::new();
        assert!(extractor.extract("Erdem sleeps.").is_empty());
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("...").is_empty());
        assert!(extractor.extract("Hello world!").is_empty());
    }

    #[test]
    fn test_no_verb_head_yields_nothing() {
        // Subject and object present, but nothing is governed by a verb
        let sentence = ParsedSentence::new(
            "Ali, FastAPI",
            vec![
                token("Ali", "ali", PartOfSpeech::ProperNoun, DepRole::Nsubj, 0),
                token(",", ",", PartOfSpeech::Punct, DepRole::Punct, 0),
                token("FastAPI", "fastapi", PartOfSpeech::ProperNoun, DepRole::Dobj, 0),
            ],
        );
        let extractor = TripletExtractor::with_parser(FixedParser(vec![sentence]));
        assert!(extractor.extract("anything").is_empty());
    }

    #[test]
    fn test_predicate_is_head_lemma() {
        let sentence = ParsedSentence::new(
            "Ali recommended FastAPI",
            vec![
                token("Ali", "ali", PartOfSpeech::ProperNoun, DepRole::Nsubj, 1),
                token("recommended", "recommend", PartOfSpeech::Verb, DepRole::Root, 1),
                token("FastAPI", "fastapi", PartOfSpeech::ProperNoun, DepRole::Dobj, 1),
            ],
        );
        let extractor = TripletExtractor::with_parser(FixedParser(vec![sentence]));
        assert_eq!(
            extractor.extract("ignored"),
            vec![Triplet::new("Ali", "recommend", "FastAPI")]
        );
    }

    #[test]
    fn test_out_of_range_head_is_ignored() {
        let sentence = ParsedSentence::new(
            "broken",
            vec![token("Ali", "ali", PartOfSpeech::ProperNoun, DepRole::Nsubj, 9)],
        );
        let extractor = TripletExtractor::with_parser(FixedParser(vec![sentence]));
        assert!(extractor.extract("broken").is_empty());
    }

    #[test]
    fn test_extract_messages_attaches_provenance() {
        let extractor = TripletExtractor::new();
        let messages = vec![
            ChatMessage::new("Ali", "Ali recommends FastAPI.", "2024-05-01T10:00:00"),
            ChatMessage::new("Erdem", "Hello everyone!", "2024-05-01T10:01:00"),
            ChatMessage::new("Ayşe", "Ayşe likes Rust.", "2024-05-01T10:02:00"),
        ];

        let triplets = extractor.extract_messages(&messages);
        assert_eq!(triplets.len(), 2);
        assert_eq!(triplets[0].author, "Ali");
        assert_eq!(triplets[0].record.timestamp, "2024-05-01T10:00:00");
        assert_eq!(triplets[0].id(), None);
        assert_eq!(triplets[1].author, "Ayşe");
        assert_eq!(triplets[1].predicate(), "like");
    }
}
