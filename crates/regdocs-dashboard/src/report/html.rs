use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::error::AppError;
use crate::model::{AggregateResult, CodeEntry, CodeTable, DocumentType, Facets};

const STYLE: &str = include_str!("../../assets/dashboard.css");
const SCRIPT: &str = include_str!("../../assets/dashboard.js");

/// Result lists longer than this are cut off with a notice in the page.
pub const MAX_VISIBLE: usize = 500;

pub struct RenderOptions<'a> {
    /// Shown as "Senast uppdaterad"; passed in so rendering never reads the clock.
    pub generated_at: DateTime<FixedOffset>,
    pub site_base: &'a str,
}

#[derive(Serialize)]
struct TypeInfo {
    value: &'static str,
    label: &'static str,
    badge: &'static str,
}

/// Renders the single-file dashboard.
///
/// The full document list and code table are embedded as JSON; filtering,
/// sorting, the result cap and the CSV download all happen in the browser.
pub fn render_html(
    aggregate: &AggregateResult,
    facets: &Facets,
    codes: &CodeTable,
    options: &RenderOptions<'_>,
) -> Result<String, AppError> {
    let type_info: Vec<TypeInfo> = DocumentType::ALL
        .into_iter()
        .map(|t| TypeInfo {
            value: t.label(),
            label: t.plural_label(),
            badge: t.badge_class(),
        })
        .collect();

    let mut out = String::with_capacity(64 * 1024);
    out.push_str("<!DOCTYPE html>\n<html lang=\"sv\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Regeringens dokument - Komplett Dashboard</title>\n");
    out.push_str(&format!("<style>\n{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n<div class=\"container\">\n");

    out.push_str(&format!(
        "<div class=\"header\">\n<h1>Regeringens dokument</h1>\n\
         <p>Sök och filtrera bland regeringsdokument</p>\n\
         <p>Senast uppdaterad: {}</p>\n</div>\n",
        options.generated_at.format("%Y-%m-%d %H:%M")
    ));

    out.push_str("<div class=\"stats\" id=\"stats\">\n");
    out.push_str(&stat_box(aggregate.documents.len(), "Totalt"));
    for t in DocumentType::ALL {
        out.push_str(&stat_box(facets.count(t), t.plural_label()));
    }
    out.push_str("</div>\n");

    out.push_str(
        "<div class=\"control-buttons\">\n\
         <button onclick=\"clearAllFilters()\">Rensa alla filter</button>\n\
         <button onclick=\"selectAllDocTypes()\">Välj alla dokumenttyper</button>\n\
         <button onclick=\"selectAllDepartments()\">Välj alla departement</button>\n\
         <button onclick=\"selectAllCategories()\">Välj alla kategorier</button>\n\
         <button onclick=\"exportResults()\">Exportera resultat (CSV)</button>\n\
         </div>\n",
    );

    out.push_str("<div class=\"filters\">\n");

    out.push_str("<div class=\"filter-section\">\n<h3>Dokumenttyp</h3>\n<div id=\"doctypes\">\n");
    for t in DocumentType::ALL {
        out.push_str(&checkbox(
            "doctype-filter",
            t.label(),
            &format!("{} ({})", t.plural_label(), facets.count(t)),
            true,
        ));
    }
    out.push_str("</div>\n</div>\n");

    out.push_str(&entry_section(
        "Departement",
        "departments",
        "dept-filter",
        &facets.departments,
    ));
    out.push_str(&entry_section(
        "Kategorier",
        "categories",
        "cat-filter",
        &facets.categories,
    ));
    out.push_str("</div>\n");

    out.push_str(
        "<div class=\"results\">\n\
         <input type=\"text\" id=\"searchBox\" placeholder=\"Sök i titlar, sammanfattningar och ID...\" oninput=\"filterDocuments()\">\n\
         <div class=\"result-count\" id=\"resultCount\">Visar alla dokument</div>\n\
         <div id=\"document-list\"></div>\n\
         </div>\n",
    );
    out.push_str("</div>\n");

    out.push_str("<script>\n");
    out.push_str(&format!("const allDocuments = {};\n", script_json(&aggregate.documents)?));
    out.push_str(&format!("const allCodes = {};\n", script_json(codes)?));
    out.push_str(&format!("const DOCUMENT_TYPES = {};\n", script_json(&type_info)?));
    out.push_str(&format!("const SITE_BASE = {};\n", script_json(options.site_base)?));
    out.push_str(&format!("const MAX_VISIBLE = {MAX_VISIBLE};\n"));
    out.push_str(SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");

    Ok(out)
}

fn stat_box(number: usize, label: &str) -> String {
    format!(
        "<div class=\"stat-box\"><div class=\"stat-number\">{number}</div><div class=\"stat-label\">{}</div></div>\n",
        escape_html(label)
    )
}

fn checkbox(class: &str, value: &str, label: &str, checked: bool) -> String {
    format!(
        "<div class=\"checkbox-item\"><label><input type=\"checkbox\" class=\"{class}\" value=\"{}\" onchange=\"filterDocuments()\"{}> {}</label></div>\n",
        escape_html(value),
        if checked { " checked" } else { "" },
        escape_html(label)
    )
}

fn entry_section(title: &str, id: &str, class: &str, entries: &[CodeEntry]) -> String {
    let mut out = format!(
        "<div class=\"filter-section\">\n<h3>{title} ({} st)</h3>\n<div id=\"{id}\">\n",
        entries.len()
    );
    for entry in entries {
        out.push_str(&checkbox(class, &entry.code.key(), &entry.name, false));
    }
    out.push_str("</div>\n</div>\n");
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// JSON for inline `<script>` use. `</` is escaped so embedded text cannot
/// close the script element early.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::aggregate::aggregate;
    use crate::facets::build_facets;
    use crate::model::{Code, RawDocument, SourceLists};

    fn render(sources: &SourceLists, codes: &CodeTable) -> String {
        let result = aggregate(sources, codes);
        let facets = build_facets(&result);
        let options = RenderOptions {
            generated_at: FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 6, 3, 14, 5, 0)
                .unwrap(),
            site_base: "https://www.regeringen.se",
        };
        render_html(&result, &facets, codes, &options).expect("render should succeed")
    }

    fn sample() -> (SourceLists, CodeTable) {
        let codes: CodeTable = [
            ("1", "Justitiedepartementet"),
            ("2", "Brott & straff"),
            ("3", "Miljödepartementet"),
        ]
        .into_iter()
        .collect();
        let raw = RawDocument {
            id: Some("Dir. 2025:1".to_string()),
            title: Some("Skärpta straff </script><b>".to_string()),
            senders: Some(vec![Code::Number(3), Code::Number(1)]),
            categories: Some(vec![Code::Number(2)]),
            ..RawDocument::default()
        };
        let sources = SourceLists::from([
            (DocumentType::Kommittedirektiv, vec![raw]),
            (DocumentType::Sou, vec![RawDocument::default(), RawDocument::default()]),
        ]);
        (sources, codes)
    }

    #[test]
    fn header_uses_given_timestamp() {
        let (sources, codes) = sample();
        let html = render(&sources, &codes);
        assert!(html.contains("Senast uppdaterad: 2025-06-03 14:05"));
    }

    #[test]
    fn stats_and_type_filters_show_counts() {
        let (sources, codes) = sample();
        let html = render(&sources, &codes);
        assert!(html.contains("<div class=\"stat-number\">3</div><div class=\"stat-label\">Totalt</div>"));
        assert!(html.contains("Kommittédirektiv (1)"));
        assert!(html.contains("SOU (2)"));
        assert!(html.contains("Rapporter (0)"));
        assert!(html.contains("value=\"Ds/PM\""));
    }

    #[test]
    fn facet_checkboxes_are_sorted_and_escaped() {
        let (sources, codes) = sample();
        let html = render(&sources, &codes);
        assert!(html.contains("<h3>Departement (2 st)</h3>"));
        assert!(html.contains("<h3>Kategorier (1 st)</h3>"));
        assert!(html.contains("Brott &amp; straff"));

        let justitie = html.find("> Justitiedepartementet<").unwrap();
        let miljo = html.find("> Miljödepartementet<").unwrap();
        assert!(justitie < miljo);
    }

    #[test]
    fn embedded_data_cannot_close_script() {
        let (sources, codes) = sample();
        let html = render(&sources, &codes);
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains(r#"Skärpta straff <\/script><b>"#));
        assert!(html.contains("const SITE_BASE = \"https://www.regeringen.se\";"));
        assert!(html.contains("const MAX_VISIBLE = 500;"));
    }

    #[test]
    fn empty_aggregate_still_renders() {
        let html = render(&SourceLists::new(), &CodeTable::default());
        assert!(html.contains("const allDocuments = [];"));
        assert!(html.contains("const allCodes = {};"));
        assert!(html.contains("<h3>Departement (0 st)</h3>"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
