use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::{Code, CodeTable, Document, DocumentType};
use crate::resolver::{CodeResolver, Placeholder};

/// Filter applied before exporting.
///
/// Empty fields match everything. Department and category terms are matched as
/// case-insensitive substrings of resolved names; a document passes a dimension
/// if any one of its codes matches any one term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentQuery {
    pub text: String,
    pub types: BTreeSet<DocumentType>,
    pub departments: Vec<String>,
    pub categories: Vec<String>,
}

impl DocumentQuery {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.types.is_empty()
            && self.departments.is_empty()
            && self.categories.is_empty()
    }

    pub fn matches(&self, doc: &Document, resolver: &CodeResolver<'_>) -> bool {
        if !self.types.is_empty() && !self.types.contains(&doc.document_type) {
            return false;
        }
        if !self.departments.is_empty()
            && !any_name_matches(doc.raw.sender_codes(), &self.departments, resolver)
        {
            return false;
        }
        if !self.categories.is_empty()
            && !any_name_matches(doc.raw.category_codes(), &self.categories, resolver)
        {
            return false;
        }

        let needle = self.text.trim().to_lowercase();
        needle.is_empty() || searchable_text(doc).contains(&needle)
    }
}

/// Lowercased `title summary id`, the text the free-text search runs over.
pub fn searchable_text(doc: &Document) -> String {
    format!(
        "{} {} {}",
        doc.raw.title.as_deref().unwrap_or_default(),
        doc.raw.summary.as_deref().unwrap_or_default(),
        doc.raw.id.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

fn any_name_matches(codes: &[Code], terms: &[String], resolver: &CodeResolver<'_>) -> bool {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    codes.iter().any(|code| {
        let name = resolver.resolve(code, Placeholder::Empty).to_lowercase();
        !name.is_empty() && terms.iter().any(|t| name.contains(t.as_str()))
    })
}

/// Documents matching `query`, in input order.
pub fn filter<'a>(documents: &'a [Document], codes: &CodeTable, query: &DocumentQuery) -> Vec<&'a Document> {
    let resolver = CodeResolver::new(codes);
    documents
        .iter()
        .filter(|doc| query.matches(doc, &resolver))
        .collect()
}

/// Newest first, by full timestamp so same-day documents keep the page's
/// order. Missing or unparseable values sort as 1900-01-01; ties keep their
/// relative order.
pub fn sort_by_published_desc(documents: &mut [&Document]) {
    documents.sort_by_key(|doc| std::cmp::Reverse(published_at(doc)));
}

fn earliest() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// `published` as a UTC timestamp. Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS`
/// (fractional seconds optional, read as UTC) or a bare date at midnight.
pub fn published_at(doc: &Document) -> NaiveDateTime {
    let Some(published) = doc.raw.published.as_deref().map(str::trim) else {
        return earliest();
    };
    DateTime::parse_from_rfc3339(published)
        .map(|t| t.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(published, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(published, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(published, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .unwrap_or_else(earliest)
}
