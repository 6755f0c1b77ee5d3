//! ============================================================================
//! Rule Parser - Dictionary-driven dependency labelling
//! ============================================================================
//! Segments text with UAX #29 boundaries, tags words from closed-class lists
//! and a verb lexicon, then attaches each clause around its first verb:
//! - nominal before the root  -> nsubj / nsubjpass
//! - nominal after a verb     -> dobj
//! - nominal after copula     -> attr
//! - nominal after preposition -> pobj
//! - later verbs in a clause  -> xcomp (objects attach to them)
//! - later clauses            -> conj / advcl of the first root
//! ============================================================================

use std::ops::Range;

use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use super::lexicon::{
    auxiliary_lemma, closed_class, is_adjective, is_light_auxiliary, is_negation, is_participle,
    known_verb, lemmatize_verb, looks_inflected,
};
use super::{DepRole, ParsedSentence, PartOfSpeech, SentenceParser, Token};

/// English clitics split off the preceding word
const CLITICS: &[&str] = &["n't", "'s", "'m", "'re", "'ve", "'ll", "'d"];

/// How far a light auxiliary looks ahead for the verb it supports
const AUX_LOOKAHEAD: usize = 3;

/// Built-in parser; stateless and cheap to copy
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleParser;

#[derive(Debug, Clone)]
struct Tagged {
    text: String,
    lower: String,
    pos: PartOfSpeech,
    lemma: String,
}

impl Tagged {
    fn is_possessive(&self) -> bool {
        self.pos == PartOfSpeech::Part && self.lower == "'s"
    }

    fn is_comma(&self) -> bool {
        self.text == "," || self.text == ";"
    }

    fn is_clause_boundary(&self) -> bool {
        matches!(self.pos, PartOfSpeech::CConj | PartOfSpeech::SConj) || self.is_comma()
    }

    fn is_predicate(&self) -> bool {
        matches!(self.pos, PartOfSpeech::Verb | PartOfSpeech::Aux)
    }

    fn is_phrase_part(&self) -> bool {
        matches!(
            self.pos,
            PartOfSpeech::Det | PartOfSpeech::Adj | PartOfSpeech::Num
        ) || self.pos.is_nominal()
            || self.is_possessive()
    }
}

/// A noun phrase: modifiers from `start`, nominal head at `head`
#[derive(Debug, Clone, Copy)]
struct Phrase {
    start: usize,
    head: usize,
}

impl RuleParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one already-segmented sentence
    pub fn parse_sentence(&self, sentence: &str) -> Option<ParsedSentence> {
        let words = tokenize(sentence);
        if words.is_empty() {
            return None;
        }

        let mut tags = tag_words(&words);
        disambiguate(&mut tags);

        let links = attach(&tags);
        let tokens = tags
            .into_iter()
            .zip(links)
            .map(|(tag, (dep, head))| Token {
                text: tag.text,
                lemma: tag.lemma,
                pos: tag.pos,
                dep,
                head,
            })
            .collect::<Vec<_>>();

        trace!(
            "Parsed sentence {:?}: {}",
            sentence,
            tokens
                .iter()
                .map(|t| format!("{}/{}/{}", t.text, t.pos.as_str(), t.dep))
                .collect::<Vec<_>>()
                .join(" ")
        );

        Some(ParsedSentence::new(sentence, tokens))
    }
}

impl SentenceParser for RuleParser {
    fn parse(&self, text: &str) -> Vec<ParsedSentence> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| self.parse_sentence(s))
            .collect()
    }
}

// ============================================================================
// Tokenization & Tagging
// ============================================================================

fn tokenize(sentence: &str) -> Vec<String> {
    sentence
        .split_word_bounds()
        .filter(|w| !w.trim().is_empty())
        .flat_map(split_clitic)
        .collect()
}

fn split_clitic(word: &str) -> Vec<String> {
    let normalized = word.replace('\u{2019}', "'");
    let lower = normalized.to_lowercase();

    for clitic in CLITICS {
        if let Some(stem) = lower.strip_suffix(clitic) {
            if stem.is_empty() || !stem.chars().all(char::is_alphabetic) {
                continue;
            }
            let cut = normalized.len() - clitic.len();
            let head = match stem {
                "ca" => "can".to_string(),
                "wo" => "will".to_string(),
                _ => normalized[..cut].to_string(),
            };
            return vec![head, normalized[cut..].to_string()];
        }
    }
    vec![word.to_string()]
}

fn is_number(text: &str) -> bool {
    text.chars().next().is_some_and(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || ".,:/-%".contains(c))
}

fn tag_words(words: &[String]) -> Vec<Tagged> {
    let mut seen_word = false;
    words
        .iter()
        .map(|text| {
            let lower = text.to_lowercase();
            let initial = !seen_word;
            let (pos, lemma) = tag_word(text, &lower, initial);
            if pos != PartOfSpeech::Punct {
                seen_word = true;
            }
            Tagged {
                text: text.clone(),
                lower,
                pos,
                lemma,
            }
        })
        .collect()
}

fn tag_word(text: &str, lower: &str, initial: bool) -> (PartOfSpeech, String) {
    if text.chars().all(|c| !c.is_alphanumeric()) {
        return (PartOfSpeech::Punct, text.to_string());
    }
    if is_number(text) {
        return (PartOfSpeech::Num, lower.to_string());
    }
    if lower == "'s" {
        return (PartOfSpeech::Part, lower.to_string());
    }
    if let Some(pos) = closed_class(lower) {
        let lemma = auxiliary_lemma(lower).unwrap_or(lower);
        return (pos, lemma.to_string());
    }

    let capitalized = text.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !initial {
        return (PartOfSpeech::ProperNoun, text.to_string());
    }
    if let Some(lemma) = known_verb(lower) {
        return (PartOfSpeech::Verb, lemma.to_string());
    }
    if is_adjective(lower) {
        return (PartOfSpeech::Adj, lower.to_string());
    }
    if capitalized {
        return (PartOfSpeech::ProperNoun, text.to_string());
    }
    if lower.chars().count() > 4 && lower.ends_with("ly") {
        return (PartOfSpeech::Adv, lower.to_string());
    }
    (PartOfSpeech::Noun, lower.to_string())
}

/// Context rules that the word lists alone cannot decide
fn disambiguate(tags: &mut [Tagged]) {
    let n = tags.len();

    for i in 0..n {
        let next = tags.get(i + 1).map(|t| t.pos);
        let lower = tags[i].lower.clone();

        match lower.as_str() {
            "'s" => {
                let after_nominal = i > 0
                    && matches!(tags[i - 1].pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun);
                let before_phrase = matches!(
                    next,
                    Some(PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adj | PartOfSpeech::Num)
                );
                if !(after_nominal && before_phrase) {
                    tags[i].pos = PartOfSpeech::Aux;
                    tags[i].lemma = "be".to_string();
                }
            }
            "to" if next == Some(PartOfSpeech::Verb) => {
                tags[i].pos = PartOfSpeech::Part;
            }
            "her" if !matches!(
                next,
                Some(PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adj | PartOfSpeech::Num)
            ) =>
            {
                tags[i].pos = PartOfSpeech::Pronoun;
            }
            "that" if matches!(next, Some(PartOfSpeech::Verb | PartOfSpeech::Aux)) => {
                tags[i].pos = PartOfSpeech::Pronoun;
            }
            _ => {}
        }
    }

    // A verb form right after a determiner, adjective or preposition is a noun
    for i in 1..n {
        if tags[i].pos != PartOfSpeech::Verb {
            continue;
        }
        let prev = &tags[i - 1];
        let nominal_slot = matches!(
            prev.pos,
            PartOfSpeech::Det | PartOfSpeech::Adj | PartOfSpeech::Num | PartOfSpeech::Adp
        ) || prev.is_possessive();
        if nominal_slot {
            tags[i].pos = PartOfSpeech::Noun;
            tags[i].lemma = tags[i].lower.clone();
        }
    }

    // have/do are main verbs unless they support a following verb
    for i in 0..n {
        if tags[i].pos != PartOfSpeech::Aux || !is_light_auxiliary(&tags[i].lemma) {
            continue;
        }
        let supported = tags[i + 1..]
            .iter()
            .filter(|t| {
                !(matches!(
                    t.pos,
                    PartOfSpeech::Adv | PartOfSpeech::Pronoun | PartOfSpeech::ProperNoun
                ) || is_negation(&t.lower))
            })
            .take(1)
            .any(|t| t.is_predicate());
        let within_reach = tags[i + 1..]
            .iter()
            .take(AUX_LOOKAHEAD + 1)
            .any(|t| t.is_predicate());
        if !(supported && within_reach) {
            tags[i].pos = PartOfSpeech::Verb;
        }
    }

    // No verb at all: promote the first inflected-looking word after a nominal
    if !tags.iter().any(|t| t.pos == PartOfSpeech::Verb) {
        let candidate = (1..n).find(|&i| {
            tags[i].pos == PartOfSpeech::Noun
                && tags[i - 1].pos.is_nominal()
                && looks_inflected(&tags[i].lower)
        });
        if let Some(i) = candidate {
            tags[i].pos = PartOfSpeech::Verb;
            tags[i].lemma = lemmatize_verb(&tags[i].lower);
        }
    }
}

// ============================================================================
// Dependency Attachment
// ============================================================================

fn split_clauses(tags: &[Tagged]) -> Vec<Range<usize>> {
    let n = tags.len();
    let mut starts = vec![0];

    for i in 1..n {
        if !tags[i].is_clause_boundary() {
            continue;
        }
        let mut saw_nominal = false;
        let mut opens = false;
        for t in &tags[i + 1..] {
            if t.is_clause_boundary() {
                break;
            }
            if t.pos.is_nominal() {
                saw_nominal = true;
            } else if saw_nominal && t.is_predicate() {
                opens = true;
                break;
            }
        }
        let current = *starts.last().unwrap_or(&0);
        let closes = tags[current..i].iter().any(Tagged::is_predicate);
        if opens && closes {
            starts.push(i);
        }
    }

    starts
        .iter()
        .enumerate()
        .map(|(k, &start)| start..starts.get(k + 1).copied().unwrap_or(n))
        .collect()
}

fn attach(tags: &[Tagged]) -> Vec<(DepRole, usize)> {
    let mut links: Vec<Option<(DepRole, usize)>> = vec![None; tags.len()];
    let mut first_root = None;

    for range in split_clauses(tags) {
        let root = attach_clause(tags, range, first_root, &mut links);
        first_root.get_or_insert(root);
    }

    let fallback = first_root.unwrap_or(0);
    links
        .into_iter()
        .map(|link| link.unwrap_or((DepRole::Dep, fallback)))
        .collect()
}

fn noun_phrases(tags: &[Tagged], body: &Range<usize>, root: usize) -> Vec<Phrase> {
    let mut phrases = Vec::new();
    let mut i = body.start;

    while i < body.end {
        if i == root || !tags[i].is_phrase_part() {
            i += 1;
            continue;
        }
        let start = i;
        let mut head = None;
        let mut j = i;
        while j < body.end && j != root && tags[j].is_phrase_part() {
            if tags[j].pos == PartOfSpeech::Pronoun {
                if head.is_none() {
                    head = Some(j);
                }
                break;
            }
            if tags[j].pos.is_nominal() {
                head = Some(j);
            }
            j += 1;
        }
        match head {
            Some(h) => {
                phrases.push(Phrase { start, head: h });
                i = h + 1;
            }
            None => i = j.max(i + 1),
        }
    }
    phrases
}

/// Only conjunctions and commas sit between the two positions
fn coordinated(tags: &[Tagged], left_head: usize, right_start: usize) -> bool {
    let between = &tags[left_head + 1..right_start];
    !between.is_empty()
        && between
            .iter()
            .all(|t| t.pos == PartOfSpeech::CConj || t.is_comma())
}

fn attach_clause(
    tags: &[Tagged],
    range: Range<usize>,
    first_root: Option<usize>,
    links: &mut [Option<(DepRole, usize)>],
) -> usize {
    let boundary = first_root.map(|_| range.start);
    let body = match boundary {
        Some(b) if b + 1 < range.end => b + 1..range.end,
        _ => range.clone(),
    };

    let root = body
        .clone()
        .find(|&i| tags[i].pos == PartOfSpeech::Verb)
        .or_else(|| body.clone().find(|&i| tags[i].pos == PartOfSpeech::Aux))
        .or_else(|| body.clone().find(|&i| tags[i].pos.is_nominal()))
        .unwrap_or(body.start);

    let subordinate = boundary.is_some_and(|b| tags[b].pos == PartOfSpeech::SConj);
    links[root] = Some(match first_root {
        None => (DepRole::Root, root),
        Some(first) if subordinate => (DepRole::Advcl, first),
        Some(first) => (DepRole::Conj, first),
    });
    if let (Some(b), Some(first)) = (boundary, first_root) {
        if b != root {
            links[b] = Some(match tags[b].pos {
                PartOfSpeech::CConj => (DepRole::Cc, first),
                PartOfSpeech::SConj => (DepRole::Mark, root),
                _ => (DepRole::Punct, first),
            });
        }
    }

    let root_pos = tags[root].pos;
    let passive = root_pos == PartOfSpeech::Verb
        && (body.start..root).any(|i| tags[i].pos == PartOfSpeech::Aux && tags[i].lemma == "be")
        && is_participle(&tags[root].lower, &tags[root].lemma);

    // Latest verb before `i` inside the clause, else the root
    let governor = |i: usize| -> usize {
        if i <= root {
            return root;
        }
        (root + 1..i)
            .rev()
            .find(|&k| tags[k].pos == PartOfSpeech::Verb)
            .unwrap_or(root)
    };

    let phrases = noun_phrases(tags, &body, root);

    for phrase in &phrases {
        for k in phrase.start..phrase.head {
            let tag = &tags[k];
            links[k] = Some(if tag.is_possessive() {
                (DepRole::Case, k.saturating_sub(1))
            } else {
                match tag.pos {
                    PartOfSpeech::Det => (DepRole::Det, phrase.head),
                    PartOfSpeech::Adj => (DepRole::Amod, phrase.head),
                    PartOfSpeech::Num => (DepRole::Nummod, phrase.head),
                    _ if tags.get(k + 1).is_some_and(Tagged::is_possessive) => {
                        (DepRole::Poss, phrase.head)
                    }
                    _ => (DepRole::Compound, phrase.head),
                }
            });
        }
    }

    // Phrases before the root: the first of the last coordinated run is the subject
    let before: Vec<Phrase> = phrases.iter().copied().filter(|p| p.head < root).collect();
    if let Some(last) = before.len().checked_sub(1) {
        let mut s = last;
        while s > 0 && coordinated(tags, before[s - 1].head, before[s].start) {
            s -= 1;
        }
        let subject = before[s];
        links[subject.head] = Some(match root_pos {
            PartOfSpeech::Verb if passive => (DepRole::NsubjPass, root),
            PartOfSpeech::Verb | PartOfSpeech::Aux => (DepRole::Nsubj, root),
            _ => (DepRole::Dep, root),
        });
        for p in &before[s + 1..] {
            links[p.head] = Some((DepRole::Conj, subject.head));
        }
        for p in &before[..s] {
            links[p.head] = Some(match p.start.checked_sub(1) {
                Some(prev) if prev >= body.start && tags[prev].pos == PartOfSpeech::Adp => {
                    (DepRole::Pobj, prev)
                }
                _ => (DepRole::Dep, root),
            });
        }
    }

    for phrase in phrases.iter().filter(|p| p.head > root) {
        let prev = phrase.start - 1;
        let link = if tags[prev].pos == PartOfSpeech::Adp {
            (DepRole::Pobj, prev)
        } else if prev > body.start
            && (tags[prev].pos == PartOfSpeech::CConj || tags[prev].is_comma())
            && phrases.iter().any(|p| p.head == prev - 1)
        {
            (DepRole::Conj, prev - 1)
        } else {
            let gov = governor(phrase.start);
            match tags[gov].pos {
                PartOfSpeech::Verb => (DepRole::Dobj, gov),
                PartOfSpeech::Aux => (DepRole::Attr, gov),
                _ => (DepRole::Dep, gov),
            }
        };
        links[phrase.head] = Some(link);
    }

    // Everything not covered by a phrase
    for i in body.clone() {
        if links[i].is_some() {
            continue;
        }
        let tag = &tags[i];
        let gov = governor(i);
        links[i] = Some(match tag.pos {
            PartOfSpeech::Aux if i < root && root_pos == PartOfSpeech::Verb => {
                if passive && tag.lemma == "be" {
                    (DepRole::AuxPass, root)
                } else {
                    (DepRole::Aux, root)
                }
            }
            PartOfSpeech::Part if tag.lower == "to" => match tags.get(i + 1) {
                Some(next) if i + 1 < body.end && next.pos == PartOfSpeech::Verb => {
                    (DepRole::Aux, i + 1)
                }
                _ => (DepRole::Prep, gov),
            },
            PartOfSpeech::Part if tag.is_possessive() => (DepRole::Case, i.saturating_sub(1)),
            PartOfSpeech::Part => (DepRole::Neg, gov),
            PartOfSpeech::Adv if is_negation(&tag.lower) => (DepRole::Neg, gov),
            PartOfSpeech::Adv => (DepRole::Advmod, gov),
            PartOfSpeech::Adp => (DepRole::Prep, gov),
            PartOfSpeech::Verb if i > root => {
                if tags[i - 1].pos == PartOfSpeech::CConj {
                    (DepRole::Conj, root)
                } else {
                    (DepRole::Xcomp, gov)
                }
            }
            PartOfSpeech::CConj => (DepRole::Cc, gov),
            PartOfSpeech::SConj => (DepRole::Mark, root),
            PartOfSpeech::Punct => (DepRole::Punct, root),
            PartOfSpeech::Intj => (DepRole::Intj, root),
            _ => (DepRole::Dep, root),
        });
    }

    root
}
