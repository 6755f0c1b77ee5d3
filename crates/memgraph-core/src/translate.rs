//! ============================================================================
//! Question Translator - Natural-language question -> Filter
//! ============================================================================
//! An ordered table of keyword rules is evaluated against the lower-cased
//! question. Patterns are literal substrings, so a keyword buried inside an
//! unrelated word still matches ("ui" in "quito"). Rules run top to bottom:
//!
//! - `set`    assign a filter field; a later match for the same field wins
//! - `finish` set the return shape and stop evaluating immediately
//! - `return` set the return shape and keep going
//!
//! The built-in table lists authors first, then the "who said what"
//! short-circuit, then entity keywords, then the generic "who" rules.
//! ============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{Filter, MemoryError, MemoryResult, ReturnShape};

/// Filter field a rule can assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Author,
    Subject,
    Predicate,
    Object,
}

impl FilterField {
    fn assign(self, filter: &mut Filter, value: &str) {
        let slot = match self {
            FilterField::Author => &mut filter.author,
            FilterField::Subject => &mut filter.subject,
            FilterField::Predicate => &mut filter.predicate,
            FilterField::Object => &mut filter.object,
        };
        *slot = Some(value.to_string());
    }
}

/// What a matching rule does to the filter under construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RuleAction {
    Set { field: FilterField, value: String },
    Finish { shape: ReturnShape },
    Return { shape: ReturnShape },
}

/// One row of the rule table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub pattern: String,
    #[serde(flatten)]
    pub action: RuleAction,
}

impl KeywordRule {
    pub fn set(pattern: &str, field: FilterField, value: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            action: RuleAction::Set {
                field,
                value: value.to_string(),
            },
        }
    }

    pub fn finish(pattern: &str, shape: ReturnShape) -> Self {
        Self {
            pattern: pattern.to_string(),
            action: RuleAction::Finish { shape },
        }
    }

    pub fn returning(pattern: &str, shape: ReturnShape) -> Self {
        Self {
            pattern: pattern.to_string(),
            action: RuleAction::Return { shape },
        }
    }
}

fn default_rules() -> Vec<KeywordRule> {
    use FilterField::*;

    vec![
        // authors
        KeywordRule::set("ayşe", Author, "Ayşe"),
        KeywordRule::set("ayse", Author, "Ayşe"),
        KeywordRule::set("erdem", Author, "Erdem"),
        KeywordRule::set("ali", Author, "Ali"),
        // who said what
        KeywordRule::finish("ne dedi", ReturnShape::Triplet),
        KeywordRule::finish("who said what", ReturnShape::Triplet),
        // subjects
        KeywordRule::set("sistem", Subject, "system"),
        KeywordRule::set("system", Subject, "system"),
        // predicates
        KeywordRule::set("sev", Predicate, "like"),
        KeywordRule::set("beğen", Predicate, "like"),
        KeywordRule::set("like", Predicate, "like"),
        KeywordRule::set("love", Predicate, "like"),
        KeywordRule::set("öner", Predicate, "recommend"),
        KeywordRule::set("recommend", Predicate, "recommend"),
        KeywordRule::set("geliştir", Predicate, "build"),
        KeywordRule::set("build", Predicate, "build"),
        KeywordRule::set("sakla", Predicate, "store"),
        KeywordRule::set("store", Predicate, "store"),
        // objects
        KeywordRule::set("rust", Object, "Rust"),
        KeywordRule::set("fastapi", Object, "FastAPI"),
        KeywordRule::set("ui", Object, "UI"),
        KeywordRule::set("triplet", Object, "triplets"),
        // who
        KeywordRule::returning("kim", ReturnShape::Subject),
        KeywordRule::returning("who", ReturnShape::Subject),
    ]
}

/// Keyword-table translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTranslator {
    rules: Vec<KeywordRule>,
}

impl Default for QuestionTranslator {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl QuestionTranslator {
    /// Build from an explicit table. Patterns are lower-cased; empty
    /// patterns or empty `set` values are rejected.
    pub fn new(rules: Vec<KeywordRule>) -> MemoryResult<Self> {
        let mut normalized = Vec::with_capacity(rules.len());
        for (index, mut rule) in rules.into_iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                return Err(MemoryError::InvalidRuleTable(format!(
                    "rule {} has an empty pattern",
                    index
                )));
            }
            if let RuleAction::Set { value, .. } = &rule.action {
                if value.trim().is_empty() {
                    return Err(MemoryError::InvalidRuleTable(format!(
                        "rule {} ({:?}) sets an empty value",
                        index, rule.pattern
                    )));
                }
            }
            rule.pattern = rule.pattern.to_lowercase();
            normalized.push(rule);
        }
        Ok(Self { rules: normalized })
    }

    /// Parse a JSON array of rules
    pub fn from_json(json: &str) -> MemoryResult<Self> {
        let rules: Vec<KeywordRule> =
            serde_json::from_str(json).map_err(|e| MemoryError::InvalidRuleTable(e.to_string()))?;
        Self::new(rules)
    }

    /// Load a rule file from disk
    pub fn from_file(path: &Path) -> MemoryResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            MemoryError::InvalidRuleTable(format!("{}: {}", path.display(), e))
        })?;
        let translator = Self::from_json(&json)?;
        info!("Loaded {} translator rules from {}", translator.rules.len(), path.display());
        Ok(translator)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn to_json(&self) -> MemoryResult<String> {
        serde_json::to_string_pretty(&self.rules)
            .map_err(|e| MemoryError::InvalidRuleTable(e.to_string()))
    }

    pub fn translate(&self, question: &str) -> Filter {
        let question = question.to_lowercase();
        let mut filter = Filter::default();

        for rule in &self.rules {
            if !question.contains(&rule.pattern) {
                continue;
            }
            match &rule.action {
                RuleAction::Set { field, value } => field.assign(&mut filter, value),
                RuleAction::Finish { shape } => {
                    filter.return_shape = Some(*shape);
                    debug!("Rule {:?} finished translation: {:?}", rule.pattern, filter);
                    return filter;
                }
                RuleAction::Return { shape } => filter.return_shape = Some(*shape),
            }
        }

        debug!("Translated {:?} -> {:?}", question, filter);
        filter
    }
}
