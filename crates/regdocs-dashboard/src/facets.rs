use std::collections::BTreeMap;

use crate::model::{AggregateResult, DocumentType, Facets};

/// Presentation-ready filter dimensions.
///
/// Every enumerated type gets a count, zero when no document has it.
pub fn build_facets(aggregate: &AggregateResult) -> Facets {
    let zeroed: BTreeMap<DocumentType, usize> =
        DocumentType::ALL.into_iter().map(|t| (t, 0)).collect();

    let document_type_counts = aggregate
        .documents
        .iter()
        .fold(zeroed, |mut counts, doc| {
            *counts.entry(doc.document_type).or_insert(0) += 1;
            counts
        });

    Facets {
        document_type_counts,
        departments: aggregate.departments.clone(),
        categories: aggregate.categories.clone(),
    }
}
