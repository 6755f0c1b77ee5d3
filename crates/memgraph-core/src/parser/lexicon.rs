//! Word lists and lemmatization rules for the rule parser.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use super::PartOfSpeech;

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "every", "each", "no", "all", "both", "another", "either", "neither",
];

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "who", "whom", "what",
    "someone", "somebody", "everyone", "everybody", "something", "everything", "nobody", "nothing",
    "anyone", "anything", "mine", "yours", "ours", "theirs", "myself", "yourself", "himself",
    "herself", "itself", "ourselves", "themselves",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet"];

const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "if", "when", "while", "unless", "whereas", "once", "until",
];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "with", "for", "from", "by", "about", "of", "into", "onto", "over", "under",
    "after", "before", "during", "through", "between", "among", "without", "within", "across",
    "against", "toward", "towards", "around", "behind", "near", "via", "per", "than", "to", "as",
    "since", "upon", "beside", "beyond",
];

const ADVERBS: &[&str] = &[
    "very", "also", "really", "too", "just", "never", "always", "often", "already", "still",
    "even", "only", "quite", "now", "then", "here", "there", "today", "yesterday", "tomorrow",
    "soon", "again", "well", "much", "more", "most", "so", "sometimes", "usually", "ever",
    "almost", "later", "together", "maybe", "perhaps",
];

const NEGATIONS: &[&str] = &["not", "n't", "never"];

const INTERJECTIONS: &[&str] = &[
    "hello", "hi", "hey", "thanks", "thank", "yes", "ok", "okay", "wow", "oh", "please", "bye",
];

const ADJECTIVES: &[&str] = &[
    "good", "great", "bad", "new", "old", "big", "small", "fast", "slow", "easy", "hard", "best",
    "better", "worse", "nice", "cool", "simple", "important", "favorite", "favourite", "local",
    "modern", "useful", "happy", "free", "large", "little", "long", "short", "high", "low",
    "first", "last", "next", "other", "same", "different", "amazing", "awesome", "interesting",
    "popular", "powerful", "reliable", "secure", "stable", "clean", "strong",
];

/// Auxiliary surface forms mapped to their lemma
const AUXILIARIES: &[(&str, &str)] = &[
    ("am", "be"),
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("be", "be"),
    ("been", "be"),
    ("being", "be"),
    ("'m", "be"),
    ("'re", "be"),
    ("has", "have"),
    ("have", "have"),
    ("had", "have"),
    ("'ve", "have"),
    ("do", "do"),
    ("does", "do"),
    ("did", "do"),
    ("will", "will"),
    ("'ll", "will"),
    ("would", "would"),
    ("'d", "would"),
    ("can", "can"),
    ("could", "could"),
    ("should", "should"),
    ("may", "may"),
    ("might", "might"),
    ("must", "must"),
    ("shall", "shall"),
];

/// Base forms of verbs the parser recognises without context
const VERB_BASES: &[&str] = &[
    "recommend", "like", "love", "hate", "prefer", "enjoy", "use", "build", "create", "make",
    "write", "read", "store", "save", "load", "want", "need", "know", "think", "say", "tell",
    "ask", "answer", "help", "suggest", "develop", "design", "test", "deploy", "fix", "learn",
    "teach", "study", "work", "play", "watch", "visit", "buy", "sell", "pay", "eat", "drink",
    "cook", "open", "close", "start", "finish", "stop", "plan", "call", "send", "receive",
    "share", "find", "lose", "keep", "choose", "try", "support", "manage", "lead", "join", "meet",
    "move", "live", "travel", "drive", "review", "refactor", "implement", "install", "configure",
    "run", "launch", "release", "ship", "merge", "commit", "push", "pull", "fork", "publish",
    "train", "analyze", "analyse", "extract", "query", "update", "delete", "remove", "add",
    "include", "contain", "require", "provide", "follow", "leave", "bring", "take", "give",
    "get", "go", "come", "see", "show", "hear", "feel", "speak", "talk", "chat", "discuss",
    "explain", "mention", "remember", "forget", "believe", "understand", "mean", "own", "wear",
    "win", "paint", "draw", "sing", "swim", "fly", "ride", "improve", "fund", "hire", "invite",
    "prepare", "organize", "attend", "order", "book", "rent", "miss", "adopt", "begin", "grow",
    "hold", "spend", "stand", "break", "catch", "teach", "choose", "drink", "sleep", "sit",
    "set", "put", "cut", "hit", "let", "become", "seem", "look", "watch", "wait", "listen",
    "migrate", "host", "debug", "benchmark", "integrate", "document", "rewrite", "replace",
];

/// Irregular verbs: base form and its non-regular past/participle forms
const IRREGULAR_VERBS: &[(&str, &[&str])] = &[
    ("go", &["went", "gone"]),
    ("make", &["made"]),
    ("take", &["took", "taken"]),
    ("get", &["got", "gotten"]),
    ("give", &["gave", "given"]),
    ("know", &["knew", "known"]),
    ("think", &["thought"]),
    ("say", &["said"]),
    ("see", &["saw", "seen"]),
    ("come", &["came"]),
    ("become", &["became"]),
    ("write", &["wrote", "written"]),
    ("rewrite", &["rewrote", "rewritten"]),
    ("build", &["built"]),
    ("buy", &["bought"]),
    ("bring", &["brought"]),
    ("find", &["found"]),
    ("tell", &["told"]),
    ("feel", &["felt"]),
    ("leave", &["left"]),
    ("meet", &["met"]),
    ("run", &["ran"]),
    ("read", &[]),
    ("send", &["sent"]),
    ("speak", &["spoke", "spoken"]),
    ("teach", &["taught"]),
    ("learn", &["learned", "learnt"]),
    ("begin", &["began", "begun"]),
    ("choose", &["chose", "chosen"]),
    ("drive", &["drove", "driven"]),
    ("eat", &["ate", "eaten"]),
    ("fly", &["flew", "flown"]),
    ("forget", &["forgot", "forgotten"]),
    ("grow", &["grew", "grown"]),
    ("hold", &["held"]),
    ("keep", &["kept"]),
    ("lose", &["lost"]),
    ("pay", &["paid"]),
    ("put", &[]),
    ("set", &[]),
    ("cut", &[]),
    ("hit", &[]),
    ("let", &[]),
    ("sell", &["sold"]),
    ("show", &["showed", "shown"]),
    ("sing", &["sang", "sung"]),
    ("sit", &["sat"]),
    ("sleep", &["slept"]),
    ("spend", &["spent"]),
    ("stand", &["stood"]),
    ("swim", &["swam", "swum"]),
    ("understand", &["understood"]),
    ("win", &["won"]),
    ("wear", &["wore", "worn"]),
    ("break", &["broke", "broken"]),
    ("catch", &["caught"]),
    ("draw", &["drew", "drawn"]),
    ("drink", &["drank", "drunk"]),
    ("hear", &["heard"]),
    ("lead", &["led"]),
    ("mean", &["meant"]),
    ("ride", &["rode", "ridden"]),
];

/// Verbs that double their final consonant before -ed / -ing
const DOUBLING: &[&str] = &[
    "stop", "plan", "chat", "ship", "drop", "prefer", "commit", "admit", "shop", "swap", "map",
    "log", "run", "get", "set", "put", "sit", "begin", "forget", "swim", "hit", "cut", "occur",
    "refer", "submit", "debug", "let", "win",
];

static DETERMINER_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| DETERMINERS.iter().copied().collect());
static PRONOUN_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| PRONOUNS.iter().copied().collect());
static CONJUNCTION_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| CONJUNCTIONS.iter().copied().collect());
static SUBORDINATOR_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| SUBORDINATORS.iter().copied().collect());
static PREPOSITION_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| PREPOSITIONS.iter().copied().collect());
static ADVERB_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ADVERBS.iter().copied().collect());
static NEGATION_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| NEGATIONS.iter().copied().collect());
static INTERJECTION_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| INTERJECTIONS.iter().copied().collect());
static ADJECTIVE_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ADJECTIVES.iter().copied().collect());
static AUXILIARY_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| AUXILIARIES.iter().copied().collect());

/// Every known inflected verb form mapped to its lemma
static VERB_FORMS: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let irregular: HashMap<&str, &[&str]> = IRREGULAR_VERBS.iter().copied().collect();
    let doubling: HashSet<&str> = DOUBLING.iter().copied().collect();

    let mut forms = HashMap::new();
    for base in VERB_BASES.iter().chain(irregular.keys()) {
        let doubles = doubling.contains(base);
        forms.insert(base.to_string(), base.to_string());
        forms.insert(third_person(base), base.to_string());
        forms.insert(gerund(base, doubles), base.to_string());
        match irregular.get(base) {
            Some(extra) if !extra.is_empty() => {
                for form in extra.iter() {
                    forms.insert(form.to_string(), base.to_string());
                }
            }
            // Irregulars with no listed forms reuse the base as past tense
            Some(_) => {}
            None => {
                forms.insert(past(base, doubles), base.to_string());
            }
        }
    }
    forms
});

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn ends_consonant_y(word: &str) -> bool {
    let mut rev = word.chars().rev();
    matches!((rev.next(), rev.next()), (Some('y'), Some(c)) if !is_vowel(c))
}

fn last_char(word: &str) -> String {
    word.chars().last().map(String::from).unwrap_or_default()
}

fn third_person(base: &str) -> String {
    if ["s", "sh", "ch", "x", "z", "o"].iter().any(|s| base.ends_with(s)) {
        format!("{}es", base)
    } else if ends_consonant_y(base) {
        format!("{}ies", &base[..base.len() - 1])
    } else {
        format!("{}s", base)
    }
}

fn past(base: &str, doubles: bool) -> String {
    if base.ends_with('e') {
        format!("{}d", base)
    } else if ends_consonant_y(base) {
        format!("{}ied", &base[..base.len() - 1])
    } else if doubles {
        format!("{}{}ed", base, last_char(base))
    } else {
        format!("{}ed", base)
    }
}

fn gerund(base: &str, doubles: bool) -> String {
    if let Some(stem) = base.strip_suffix("ie") {
        format!("{}ying", stem)
    } else if base.ends_with('e') && !base.ends_with("ee") && base.len() > 2 {
        format!("{}ing", &base[..base.len() - 1])
    } else if doubles {
        format!("{}{}ing", base, last_char(base))
    } else {
        format!("{}ing", base)
    }
}

/// Undo consonant doubling or restore a dropped silent `e` on a short stem
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3 && chars[n - 1] == chars[n - 2] && !is_vowel(chars[n - 1]) && !"lsz".contains(chars[n - 1]) {
        return chars[..n - 1].iter().collect();
    }
    let cvc = n >= 2
        && n <= 4
        && !is_vowel(chars[n - 1])
        && !"wxy".contains(chars[n - 1])
        && is_vowel(chars[n - 2])
        && (n == 2 || !is_vowel(chars[n - 3]));
    if cvc {
        format!("{}e", stem)
    } else {
        stem.to_string()
    }
}

fn strip_inflection(word: &str) -> String {
    let len = word.chars().count();
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if ["ches", "shes", "xes", "zes", "oes"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 2].to_string();
    }
    if let Some(stem) = word.strip_suffix("ied") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    if len > 4 {
        if let Some(stem) = word.strip_suffix("ed") {
            return restore_stem(stem);
        }
    }
    if len > 5 {
        if let Some(stem) = word.strip_suffix("ing") {
            return restore_stem(stem);
        }
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Base form of a verb. Known forms come from the lexicon; anything else
/// falls back to English suffix rules.
pub fn lemmatize_verb(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some(lemma) = VERB_FORMS.get(&lower) {
        return lemma.clone();
    }
    strip_inflection(&lower)
}

/// Lemma of a known verb form, if the lexicon has it
pub(crate) fn known_verb(lower: &str) -> Option<&'static str> {
    VERB_FORMS.get(lower).map(|s| s.as_str())
}

pub(crate) fn auxiliary_lemma(lower: &str) -> Option<&'static str> {
    AUXILIARY_MAP.get(lower).copied()
}

/// `have` and `do` act as main verbs unless another verb follows
pub(crate) fn is_light_auxiliary(lemma: &str) -> bool {
    matches!(lemma, "have" | "do")
}

pub(crate) fn is_negation(lower: &str) -> bool {
    NEGATION_SET.contains(lower)
}

/// Closed-class lookup; open classes are decided by the caller
pub(crate) fn closed_class(lower: &str) -> Option<PartOfSpeech> {
    if auxiliary_lemma(lower).is_some() {
        return Some(PartOfSpeech::Aux);
    }
    if NEGATION_SET.contains(lower) && lower != "never" {
        return Some(PartOfSpeech::Part);
    }
    if DETERMINER_SET.contains(lower) {
        return Some(PartOfSpeech::Det);
    }
    if PRONOUN_SET.contains(lower) {
        return Some(PartOfSpeech::Pronoun);
    }
    if CONJUNCTION_SET.contains(lower) {
        return Some(PartOfSpeech::CConj);
    }
    if SUBORDINATOR_SET.contains(lower) {
        return Some(PartOfSpeech::SConj);
    }
    if PREPOSITION_SET.contains(lower) {
        return Some(PartOfSpeech::Adp);
    }
    if ADVERB_SET.contains(lower) {
        return Some(PartOfSpeech::Adv);
    }
    if INTERJECTION_SET.contains(lower) {
        return Some(PartOfSpeech::Intj);
    }
    None
}

pub(crate) fn is_adjective(lower: &str) -> bool {
    ADJECTIVE_SET.contains(lower)
        || (lower.chars().count() > 5
            && ["ful", "ous", "able", "ible"].iter().any(|s| lower.ends_with(s)))
}

/// Unknown word carrying a verbal inflection (`-s`, `-ed`)
pub(crate) fn looks_inflected(lower: &str) -> bool {
    let len = lower.chars().count();
    if len <= 3 {
        return false;
    }
    if lower.ends_with("ed") {
        return true;
    }
    lower.ends_with('s') && !["ss", "us", "is"].iter().any(|s| lower.ends_with(s))
}

/// Past participle or -ing form, as opposed to the base/present form
pub(crate) fn is_participle(lower: &str, lemma: &str) -> bool {
    lower != lemma && !lower.ends_with("ing") && lower != third_person(lemma)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_verb_forms() {
        assert_eq!(lemmatize_verb("recommends"), "recommend");
        assert_eq!(lemmatize_verb("Likes"), "like");
        assert_eq!(lemmatize_verb("built"), "build");
        assert_eq!(lemmatize_verb("stores"), "store");
        assert_eq!(lemmatize_verb("studies"), "study");
        assert_eq!(lemmatize_verb("stopped"), "stop");
        assert_eq!(lemmatize_verb("making"), "make");
        assert_eq!(lemmatize_verb("went"), "go");
        assert_eq!(lemmatize_verb("fixes"), "fix");
    }

    #[test]
    fn test_fallback_suffix_rules() {
        assert_eq!(lemmatize_verb("endorses"), "endorse");
        assert_eq!(lemmatize_verb("jumped"), "jump");
        assert_eq!(lemmatize_verb("grabbed"), "grab");
        assert_eq!(lemmatize_verb("hoped"), "hope");
        assert_eq!(lemmatize_verb("crunching"), "crunch");
        assert_eq!(lemmatize_verb("carries"), "carry");
    }

    #[test]
    fn test_closed_classes() {
        assert_eq!(closed_class("the"), Some(PartOfSpeech::Det));
        assert_eq!(closed_class("she"), Some(PartOfSpeech::Pronoun));
        assert_eq!(closed_class("was"), Some(PartOfSpeech::Aux));
        assert_eq!(closed_class("and"), Some(PartOfSpeech::CConj));
        assert_eq!(closed_class("with"), Some(PartOfSpeech::Adp));
        assert_eq!(closed_class("n't"), Some(PartOfSpeech::Part));
        assert_eq!(closed_class("fastapi"), None);
    }

    #[test]
    fn test_participles() {
        assert!(is_participle("built", "build"));
        assert!(is_participle("used", "use"));
        assert!(!is_participle("builds", "build"));
        assert!(!is_participle("building", "build"));
        assert!(!is_participle("build", "build"));
    }

    #[test]
    fn test_inflection_shape() {
        assert!(looks_inflected("endorses"));
        assert!(looks_inflected("shipped"));
        assert!(!looks_inflected("status"));
        assert!(!looks_inflected("class"));
        assert!(!looks_inflected("was"));
    }
}
