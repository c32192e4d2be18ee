use crate::model::{Code, CodeTable};

/// Name endings that mark a resolved sender as a department.
///
/// Suffix matching is approximate: any body whose name ends in
/// "departementet" counts, whether or not it is one of the ministries.
pub const DEPARTMENT_SUFFIXES: [&str; 4] = [
    "departementet",
    "Statsrådsberedningen",
    "Regeringen",
    "Regeringskansliet",
];

/// What to return for a code missing from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `Okänt (<code>)`
    Sender,
    /// `Okänd (<code>)`
    Category,
    /// Empty string; used when matching on names, where an unknown code should match nothing.
    Empty,
}

impl Placeholder {
    pub fn render(self, code: &Code) -> String {
        match self {
            Placeholder::Sender => format!("Okänt ({code})"),
            Placeholder::Category => format!("Okänd ({code})"),
            Placeholder::Empty => String::new(),
        }
    }
}

/// Maps codes to display names through a single shared table.
#[derive(Debug, Clone, Copy)]
pub struct CodeResolver<'a> {
    table: &'a CodeTable,
}

impl<'a> CodeResolver<'a> {
    pub fn new(table: &'a CodeTable) -> Self {
        Self { table }
    }

    /// Never fails: a miss yields the placeholder, which embeds the code.
    pub fn resolve(&self, code: &Code, placeholder: Placeholder) -> String {
        match self.table.get(&code.key()) {
            Some(name) => name.to_string(),
            None => placeholder.render(code),
        }
    }

    /// Resolves each code and joins the names with `, `.
    pub fn resolve_joined(&self, codes: &[Code], placeholder: Placeholder) -> String {
        codes
            .iter()
            .map(|c| self.resolve(c, placeholder))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Case-sensitive exact suffix test against [`DEPARTMENT_SUFFIXES`].
pub fn is_department(name: &str) -> bool {
    DEPARTMENT_SUFFIXES
        .iter()
        .any(|suffix| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CodeTable {
        [("1", "Justitiedepartementet"), ("2", "Myndigheten X")]
            .into_iter()
            .collect()
    }

    #[test]
    fn resolves_known_codes() {
        let table = table();
        let resolver = CodeResolver::new(&table);
        assert_eq!(
            resolver.resolve(&Code::Number(1), Placeholder::Sender),
            "Justitiedepartementet"
        );
        assert_eq!(
            resolver.resolve(&Code::from("2"), Placeholder::Category),
            "Myndigheten X"
        );
    }

    #[test]
    fn missing_codes_get_placeholders() {
        let table = table();
        let resolver = CodeResolver::new(&table);
        assert_eq!(resolver.resolve(&Code::Number(404), Placeholder::Sender), "Okänt (404)");
        assert_eq!(resolver.resolve(&Code::Number(404), Placeholder::Category), "Okänd (404)");
        assert_eq!(resolver.resolve(&Code::Number(404), Placeholder::Empty), "");
    }

    #[test]
    fn joins_names() {
        let table = table();
        let resolver = CodeResolver::new(&table);
        let joined = resolver.resolve_joined(&[Code::Number(2), Code::Number(9)], Placeholder::Category);
        assert_eq!(joined, "Myndigheten X, Okänd (9)");
        assert_eq!(resolver.resolve_joined(&[], Placeholder::Category), "");
    }

    #[test]
    fn department_suffixes() {
        assert!(is_department("Finansdepartementet"));
        assert!(is_department("Statsrådsberedningen"));
        assert!(is_department("Regeringen"));
        assert!(is_department("Regeringskansliet"));
        assert!(!is_department("Finansdepartement"));
        assert!(!is_department("Finansdepartementet "));
        assert!(!is_department("finansDEPARTEMENTET"));
        assert!(!is_department("Regeringskansliets förvaltningsavdelning"));
        assert!(!is_department(""));
    }
}
