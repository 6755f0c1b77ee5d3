//! ============================================================================
//! Sentence Parser - Dependency-labelled tokens for triplet extraction
//! ============================================================================
//! The extractor only needs three things from a parse: each token's
//! dependency role, its lemma, and the part of speech of its governing token.
//! [`SentenceParser`] is that seam; [`RuleParser`] is the built-in,
//! dictionary-driven implementation.
//!
//! ```text
//! "Ali recommends FastAPI."
//!   Ali        PROPN  nsubj  -> recommends
//!   recommends VERB   ROOT   -> recommends
//!   FastAPI    PROPN  dobj   -> recommends
//!   .          PUNCT  punct  -> recommends
//! ```
//! ============================================================================

mod lexicon;
mod rules;

pub use lexicon::lemmatize_verb;
pub use rules::RuleParser;

/// Coarse part-of-speech tags (Universal Dependencies style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Pronoun,
    Verb,
    Aux,
    Adj,
    Adv,
    Adp,
    Det,
    CConj,
    SConj,
    Part,
    Num,
    Intj,
    Punct,
    Other,
}

impl PartOfSpeech {
    /// Can head a noun phrase
    pub fn is_nominal(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Pronoun
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::ProperNoun => "PROPN",
            PartOfSpeech::Pronoun => "PRON",
            PartOfSpeech::Verb => "VERB",
            PartOfSpeech::Aux => "AUX",
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Det => "DET",
            PartOfSpeech::CConj => "CCONJ",
            PartOfSpeech::SConj => "SCONJ",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Punct => "PUNCT",
            PartOfSpeech::Other => "X",
        }
    }
}

/// Dependency relation between a token and its head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepRole {
    Root,
    Nsubj,
    NsubjPass,
    Dobj,
    Pobj,
    Attr,
    Prep,
    Det,
    Amod,
    Nummod,
    Compound,
    Poss,
    Case,
    Aux,
    AuxPass,
    Neg,
    Advmod,
    Cc,
    Conj,
    Mark,
    Advcl,
    Xcomp,
    Intj,
    Punct,
    Dep,
}

impl DepRole {
    /// Active or passive nominal subject
    pub fn is_subject(&self) -> bool {
        matches!(self, DepRole::Nsubj | DepRole::NsubjPass)
    }

    /// Direct object, prepositional object or attribute complement
    pub fn is_object(&self) -> bool {
        matches!(self, DepRole::Dobj | DepRole::Pobj | DepRole::Attr)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DepRole::Root => "ROOT",
            DepRole::Nsubj => "nsubj",
            DepRole::NsubjPass => "nsubjpass",
            DepRole::Dobj => "dobj",
            DepRole::Pobj => "pobj",
            DepRole::Attr => "attr",
            DepRole::Prep => "prep",
            DepRole::Det => "det",
            DepRole::Amod => "amod",
            DepRole::Nummod => "nummod",
            DepRole::Compound => "compound",
            DepRole::Poss => "poss",
            DepRole::Case => "case",
            DepRole::Aux => "aux",
            DepRole::AuxPass => "auxpass",
            DepRole::Neg => "neg",
            DepRole::Advmod => "advmod",
            DepRole::Cc => "cc",
            DepRole::Conj => "conj",
            DepRole::Mark => "mark",
            DepRole::Advcl => "advcl",
            DepRole::Xcomp => "xcomp",
            DepRole::Intj => "intj",
            DepRole::Punct => "punct",
            DepRole::Dep => "dep",
        }
    }
}

impl std::fmt::Display for DepRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One token of a parsed sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Verbatim surface text
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub dep: DepRole,
    /// Index of the governing token within the sentence; the root points at itself
    pub head: usize,
}

/// A sentence as a flat list of dependency-labelled tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSentence {
    pub text: String,
    pub tokens: Vec<Token>,
}

impl ParsedSentence {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }

    /// Governing token of `tokens[index]`, if the head index is in range
    pub fn governor(&self, index: usize) -> Option<&Token> {
        let token = self.tokens.get(index)?;
        self.tokens.get(token.head)
    }

    pub fn root(&self) -> Option<&Token> {
        self.tokens.iter().find(|t| t.dep == DepRole::Root)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Anything that can segment text into dependency-parsed sentences
pub trait SentenceParser {
    fn parse(&self, text: &str) -> Vec<ParsedSentence>;
}

impl<P: SentenceParser + ?Sized> SentenceParser for &P {
    fn parse(&self, text: &str) -> Vec<ParsedSentence> {
        (**self).parse(text)
    }
}

impl<P: SentenceParser + ?Sized> SentenceParser for Box<P> {
    fn parse(&self, text: &str) -> Vec<ParsedSentence> {
        (**self).parse(text)
    }
}
