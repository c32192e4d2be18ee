use std::collections::BTreeMap;

use crate::model::{AggregateResult, Code, CodeEntry, CodeTable, Document, DocumentType, SourceLists};
use crate::normalize::normalize_all;
use crate::resolver::{is_department, CodeResolver, Placeholder};

/// Merges the per-type source lists into one collection and derives the
/// department and category sets.
///
/// Documents are concatenated in [`DocumentType::ALL`] order regardless of how
/// the map was filled, each list keeping its own order. A type with no entry
/// in `sources` contributes nothing. Documents are not deduplicated; the entry
/// sets are, keyed by code, and sorted by name then code.
pub fn aggregate(sources: &SourceLists, codes: &CodeTable) -> AggregateResult {
    let documents: Vec<Document> = DocumentType::ALL
        .into_iter()
        .flat_map(|t| {
            sources
                .get(&t)
                .map(|raws| normalize_all(raws, t))
                .unwrap_or_default()
        })
        .collect();

    let resolver = CodeResolver::new(codes);

    let departments = collect_entries(
        &documents,
        |doc| doc.raw.sender_codes(),
        |code| {
            let name = resolver.resolve(code, Placeholder::Sender);
            is_department(&name).then_some(name)
        },
    );

    // Categories are taken as-is; only senders go through the department test.
    let categories = collect_entries(
        &documents,
        |doc| doc.raw.category_codes(),
        |code| Some(resolver.resolve(code, Placeholder::Category)),
    );

    AggregateResult {
        documents,
        departments,
        categories,
    }
}

fn collect_entries<'d, C, K>(documents: &'d [Document], codes_of: C, keep: K) -> Vec<CodeEntry>
where
    C: Fn(&'d Document) -> &'d [Code],
    K: Fn(&Code) -> Option<String>,
{
    let by_code = documents
        .iter()
        .flat_map(codes_of)
        .fold(BTreeMap::<&Code, String>::new(), |mut acc, code| {
            if !acc.contains_key(code) {
                if let Some(name) = keep(code) {
                    acc.insert(code, name);
                }
            }
            acc
        });

    let mut entries: Vec<CodeEntry> = by_code
        .into_iter()
        .map(|(code, name)| CodeEntry {
            name,
            code: code.clone(),
        })
        .collect();
    entries.sort();
    entries
}
