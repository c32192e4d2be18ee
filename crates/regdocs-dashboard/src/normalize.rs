use crate::model::{Document, DocumentType, RawDocument};

/// Tags a raw record with the type of its source list.
///
/// All other fields pass through untouched; absent fields stay absent.
pub fn normalize(raw: &RawDocument, document_type: DocumentType) -> Document {
    Document {
        raw: raw.clone(),
        document_type,
    }
}

/// Normalizes a whole source list, keeping its order.
pub fn normalize_all(raws: &[RawDocument], document_type: DocumentType) -> Vec<Document> {
    raws.iter().map(|raw| normalize(raw, document_type)).collect()
}
