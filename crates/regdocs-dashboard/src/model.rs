use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque sender/category code as it appears upstream.
///
/// The feeds use integers, but any JSON value is accepted: strings are kept
/// as-is, everything else that is not an `i64` keeps its JSON text (`1.0`,
/// `null`). Equality, hashing and ordering all go through the string key, so
/// `1` and `"1"` are the same code.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Code {
    Number(i64),
    Text(String),
}

impl Code {
    /// String form used for `CodeTable` lookups.
    pub fn key(&self) -> String {
        match self {
            Code::Number(n) => n.to_string(),
            Code::Text(s) => s.clone(),
        }
    }

    fn numeric(&self) -> Option<i64> {
        match self {
            Code::Number(n) => Some(*n),
            Code::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Code::Number(n) => write!(f, "{n}"),
            Code::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Code {
    fn from(n: i64) -> Self {
        Code::Number(n)
    }
}

impl From<Value> for Code {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_i64().map_or_else(|| Code::Text(n.to_string()), Code::Number),
            Value::String(s) => Code::Text(s),
            other => Code::Text(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Code::from)
    }
}

impl From<&str> for Code {
    fn from(s: &str) -> Self {
        Code::Text(s.to_string())
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Code {}

impl Hash for Code {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for Code {
    /// Numeric codes compare by value and sort before non-numeric ones.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.key().cmp(&other.key())),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.key().cmp(&other.key()),
        }
    }
}

impl PartialOrd for Code {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A document record exactly as one of the list endpoints returns it.
///
/// Every field is optional, and a field of the wrong JSON type is read as
/// absent rather than rejecting the record (and with it the whole list).
/// Fields this crate does not know about are kept in `extra` so they survive
/// into the embedded page data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "text_or_absent", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "text_or_absent", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_or_absent", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// ISO-like date, `YYYY-MM-DD` optionally followed by more.
    #[serde(default, deserialize_with = "text_or_absent", skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    /// Path relative to the publishing site.
    #[serde(default, deserialize_with = "text_or_absent", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "codes_or_absent", skip_serializing_if = "Option::is_none")]
    pub senders: Option<Vec<Code>>,
    #[serde(default, deserialize_with = "codes_or_absent", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Code>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn text_or_absent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn codes_or_absent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Code>>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.into_iter().map(Code::from).collect()),
        _ => None,
    })
}

impl RawDocument {
    pub fn sender_codes(&self) -> &[Code] {
        self.senders.as_deref().unwrap_or_default()
    }

    pub fn category_codes(&self) -> &[Code] {
        self.categories.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentType {
    #[serde(rename = "Kommittédirektiv")]
    Kommittedirektiv,
    #[serde(rename = "Ds/PM")]
    DsPm,
    #[serde(rename = "SOU")]
    Sou,
    #[serde(rename = "Regeringsuppdrag")]
    Regeringsuppdrag,
    #[serde(rename = "Rapport")]
    Rapport,
}

impl DocumentType {
    /// Concatenation order used by the aggregator.
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Kommittedirektiv,
        DocumentType::DsPm,
        DocumentType::Sou,
        DocumentType::Regeringsuppdrag,
        DocumentType::Rapport,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DocumentType::Kommittedirektiv => "Kommittédirektiv",
            DocumentType::DsPm => "Ds/PM",
            DocumentType::Sou => "SOU",
            DocumentType::Regeringsuppdrag => "Regeringsuppdrag",
            DocumentType::Rapport => "Rapport",
        }
    }

    /// Heading used in stat boxes and the type filter.
    pub fn plural_label(self) -> &'static str {
        match self {
            DocumentType::Rapport => "Rapporter",
            other => other.label(),
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            DocumentType::Kommittedirektiv => "badge-kd",
            DocumentType::DsPm => "badge-ds",
            DocumentType::Sou => "badge-sou",
            DocumentType::Regeringsuppdrag => "badge-ru",
            DocumentType::Rapport => "badge-rap",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted) || t.plural_label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown document type: {wanted}"))
    }
}

/// A raw record tagged with the type of the list it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(flatten)]
    pub raw: RawDocument,
    pub document_type: DocumentType,
}

/// Code → display name, as served by the codes endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeTable(BTreeMap<String, String>);

impl CodeTable {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A resolved (code, name) pair. Field order matters: the derived ordering
/// sorts by name first and falls back to the code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodeEntry {
    pub name: String,
    pub code: Code,
}

pub type DepartmentEntry = CodeEntry;
pub type CategoryEntry = CodeEntry;

/// Raw lists keyed by the type of the endpoint they were fetched from.
pub type SourceLists = BTreeMap<DocumentType, Vec<RawDocument>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub documents: Vec<Document>,
    pub departments: Vec<DepartmentEntry>,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Facets {
    pub document_type_counts: BTreeMap<DocumentType, usize>,
    pub departments: Vec<DepartmentEntry>,
    pub categories: Vec<CategoryEntry>,
}

impl Facets {
    pub fn count(&self, document_type: DocumentType) -> usize {
        self.document_type_counts
            .get(&document_type)
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.document_type_counts.values().sum()
    }
}
