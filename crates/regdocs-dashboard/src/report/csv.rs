use crate::model::{CodeTable, Document};
use crate::resolver::{CodeResolver, Placeholder};

/// Spreadsheet tools need the BOM to detect UTF-8.
pub const BOM: char = '\u{feff}';
pub const HEADER: &str = "Dokumenttyp;ID;Titel;Publicerad;Departement;Kategorier;URL";

/// Semicolon-separated export, one row per document in the given order.
///
/// Free-text columns (title, department names, category names) are always
/// quoted with embedded quotes doubled. Links are `site_base` + the relative
/// `url`, empty when the document has none.
pub fn render_csv(documents: &[&Document], codes: &CodeTable, site_base: &str) -> String {
    let resolver = CodeResolver::new(codes);
    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for doc in documents {
        let raw = &doc.raw;
        let row = [
            doc.document_type.label().to_string(),
            raw.id.clone().unwrap_or_default(),
            quote(raw.title.as_deref().unwrap_or_default()),
            raw.published.clone().unwrap_or_default(),
            quote(&resolver.resolve_joined(raw.sender_codes(), Placeholder::Sender)),
            quote(&resolver.resolve_joined(raw.category_codes(), Placeholder::Category)),
            raw.url
                .as_deref()
                .filter(|u| !u.is_empty())
                .map(|u| format!("{site_base}{u}"))
                .unwrap_or_default(),
        ];
        out.push_str(&row.join(";"));
        out.push('\n');
    }
    out
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Code, DocumentType, RawDocument};

    fn table() -> CodeTable {
        [("1", "Justitiedepartementet"), ("2", "Straffrätt")]
            .into_iter()
            .collect()
    }

    #[test]
    fn header_and_bom() {
        let csv = render_csv(&[], &table(), "https://www.regeringen.se");
        assert_eq!(csv, format!("{BOM}{HEADER}\n"));
        assert!(csv.as_bytes().starts_with(&[0xEF, 0xBB, 0xBF]));
    }

    #[test]
    fn full_row() {
        let doc = Document {
            raw: RawDocument {
                id: Some("Dir. 2024:7".to_string()),
                title: Some("Ett \"skärpt\" straff".to_string()),
                published: Some("2024-02-01".to_string()),
                url: Some("/rattsliga-dokument/kommittedirektiv/2024/02/dir.-20247/".to_string()),
                senders: Some(vec![Code::Number(1), Code::Number(9)]),
                categories: Some(vec![Code::Number(2)]),
                ..RawDocument::default()
            },
            document_type: DocumentType::Kommittedirektiv,
        };
        let csv = render_csv(&[&doc], &table(), "https://www.regeringen.se");
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "Kommittédirektiv;Dir. 2024:7;\"Ett \"\"skärpt\"\" straff\";2024-02-01;\
             \"Justitiedepartementet, Okänt (9)\";\"Straffrätt\";\
             https://www.regeringen.se/rattsliga-dokument/kommittedirektiv/2024/02/dir.-20247/"
        );
    }

    #[test]
    fn sparse_row() {
        let doc = Document {
            raw: RawDocument::default(),
            document_type: DocumentType::Rapport,
        };
        let csv = render_csv(&[&doc], &table(), "https://www.regeringen.se");
        assert_eq!(csv.lines().nth(1), Some("Rapport;;\"\";;\"\";\"\";"));
    }
}
