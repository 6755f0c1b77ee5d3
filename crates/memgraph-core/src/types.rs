//! ============================================================================
//! Memgraph Types - Triplets, filters, chat messages and errors
//! ============================================================================
//! Shared data structures for extraction, storage and question answering.
//! ============================================================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A (subject, predicate, object) fact pulled out of one sentence.
///
/// This is what the extractor emits. Author, timestamp and id are attached
/// later by whoever owns the originating message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    /// Lemma of the governing verb
    pub predicate: String,
    pub object: String,
}

impl Triplet {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Attach provenance, producing a record ready for the memory store
    pub fn into_record(self, timestamp: impl Into<String>) -> TripletRecord {
        TripletRecord {
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            timestamp: timestamp.into(),
            id: None,
        }
    }
}

/// A triplet as persisted under its author's key.
///
/// Field order matches the on-disk JSON layout. `id` is optional only so that
/// snapshots written before ids existed still load; see [`crate::migrate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletRecord {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    /// ISO-8601 string copied from the originating message, never parsed
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TripletRecord {
    /// Assign a fresh v4 id if the record has none. Returns true if assigned.
    pub fn ensure_id(&mut self) -> bool {
        if self.id.is_some() {
            return false;
        }
        self.id = Some(Uuid::new_v4().to_string());
        true
    }

    /// Apply a partial update; unspecified fields are left untouched
    pub fn apply(&mut self, patch: &TripletPatch) {
        if let Some(subject) = &patch.subject {
            self.subject = subject.clone();
        }
        if let Some(predicate) = &patch.predicate {
            self.predicate = predicate.clone();
        }
        if let Some(object) = &patch.object {
            self.object = object.clone();
        }
        if let Some(timestamp) = &patch.timestamp {
            self.timestamp = timestamp.clone();
        }
    }

    pub fn triplet(&self) -> Triplet {
        Triplet::new(&self.subject, &self.predicate, &self.object)
    }
}

/// A record with its author re-attached, as seen by cross-author queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoredTriplet {
    pub author: String,
    #[serde(flatten)]
    pub record: TripletRecord,
}

impl AuthoredTriplet {
    pub fn new(author: impl Into<String>, record: TripletRecord) -> Self {
        Self {
            author: author.into(),
            record,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.record.id.as_deref()
    }
}

/// Read access to the three fact fields, whatever carries them
pub trait Fact {
    fn subject(&self) -> &str;
    fn predicate(&self) -> &str;
    fn object(&self) -> &str;
}

impl Fact for Triplet {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn predicate(&self) -> &str {
        &self.predicate
    }

    fn object(&self) -> &str {
        &self.object
    }
}

impl Fact for TripletRecord {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn predicate(&self) -> &str {
        &self.predicate
    }

    fn object(&self) -> &str {
        &self.object
    }
}

impl Fact for AuthoredTriplet {
    fn subject(&self) -> &str {
        &self.record.subject
    }

    fn predicate(&self) -> &str {
        &self.record.predicate
    }

    fn object(&self) -> &str {
        &self.record.object
    }
}

/// Typed partial update for a stored triplet. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TripletPatch {
    /// Subject, predicate and object may be changed but never blanked
    pub fn validate(&self) -> MemoryResult<()> {
        let fields = [
            ("subject", &self.subject),
            ("predicate", &self.predicate),
            ("object", &self.object),
        ];
        for (name, value) in fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(MemoryError::InvalidPatch(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
            && self.timestamp.is_none()
    }
}

/// How the answer formatter should phrase each matched triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnShape {
    /// `{author} said: "{subject} {predicate} {object}"`
    Triplet,
    /// `{object} related action performed by: {subject}`
    Subject,
    #[default]
    Sentence,
}

impl std::fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnShape::Triplet => write!(f, "triplet"),
            ReturnShape::Subject => write!(f, "subject"),
            ReturnShape::Sentence => write!(f, "sentence"),
        }
    }
}

impl std::str::FromStr for ReturnShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triplet" => Ok(ReturnShape::Triplet),
            "subject" => Ok(ReturnShape::Subject),
            "sentence" | "default" => Ok(ReturnShape::Sentence),
            _ => Err(format!("Unknown return shape: {}", s)),
        }
    }
}

/// Optional equality constraints over a flattened triplet collection.
/// Every present field is compared case-insensitively; all are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub return_shape: Option<ReturnShape>,
}

impl Filter {
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    pub fn returning(mut self, shape: ReturnShape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    /// True when no equality constraint is set (the return tag does not count)
    pub fn is_unconstrained(&self) -> bool {
        self.author.is_none()
            && self.subject.is_none()
            && self.predicate.is_none()
            && self.object.is_none()
    }

    pub fn shape(&self) -> ReturnShape {
        self.return_shape.unwrap_or_default()
    }
}

/// A chat message as posted by the chat client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(
        sender: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Message stamped with the current UTC time
    pub fn now(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(sender, text, chrono::Utc::now().to_rfc3339())
    }
}

/// Error types for the memory engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Corrupt memory snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Invalid translator rule table: {0}")]
    InvalidRuleTable(String),

    #[error("Invalid triplet update: {0}")]
    InvalidPatch(String),
}

pub type MemoryResult<T> = std::result::Result<T, MemoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_leaves_unspecified_fields() {
        let mut record = Triplet::new("Ali", "recommend", "FastAPI").into_record("2024-05-01T10:00:00");
        record.apply(&TripletPatch {
            object: Some("Axum".to_string()),
            ..Default::default()
        });

        assert_eq!(record.subject, "Ali");
        assert_eq!(record.predicate, "recommend");
        assert_eq!(record.object, "Axum");
        assert_eq!(record.timestamp, "2024-05-01T10:00:00");
    }

    #[test]
    fn test_patch_validation() {
        assert!(TripletPatch::default().validate().is_ok());
        assert!(TripletPatch {
            timestamp: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .is_ok());
        assert!(matches!(
            TripletPatch {
                predicate: Some(" ".to_string()),
                ..Default::default()
            }
            .validate(),
            Err(MemoryError::InvalidPatch(_))
        ));
    }

    #[test]
    fn test_ensure_id_only_once() {
        let mut record = Triplet::new("Erdem", "build", "system").into_record("t");
        assert!(record.ensure_id());
        let first = record.id.clone();
        assert!(!record.ensure_id());
        assert_eq!(record.id, first);
    }

    #[test]
    fn test_record_json_layout() {
        let record = Triplet::new("Ali", "recommend", "FastAPI").into_record("t1");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"subject":"Ali","predicate":"recommend","object":"FastAPI","timestamp":"t1"}"#
        );
    }

    #[test]
    fn test_authored_triplet_flattens() {
        let mut record = Triplet::new("Ayşe", "like", "Rust").into_record("t");
        record.id = Some("abc".to_string());
        let authored = AuthoredTriplet::new("Ayşe", record);

        let value = serde_json::to_value(&authored).unwrap();
        assert_eq!(value["author"], "Ayşe");
        assert_eq!(value["predicate"], "like");
        assert_eq!(value["id"], "abc");

        let back: AuthoredTriplet = serde_json::from_value(value).unwrap();
        assert_eq!(back, authored);
    }

    #[test]
    fn test_filter_return_tag() {
        let filter: Filter = serde_json::from_str(r#"{"author":"Ayşe","return":"triplet"}"#).unwrap();
        assert_eq!(filter.author.as_deref(), Some("Ayşe"));
        assert_eq!(filter.shape(), ReturnShape::Triplet);
        assert_eq!(Filter::default().shape(), ReturnShape::Sentence);
    }

    #[test]
    fn test_return_shape_parsing() {
        assert_eq!("subject".parse::<ReturnShape>().unwrap(), ReturnShape::Subject);
        assert_eq!("Triplet".parse::<ReturnShape>().unwrap(), ReturnShape::Triplet);
        assert!("graph".parse::<ReturnShape>().is_err());
    }
}
