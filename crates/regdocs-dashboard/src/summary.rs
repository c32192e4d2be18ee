use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::model::{AggregateResult, CodeTable, DocumentType, Facets};
use crate::resolver::{CodeResolver, Placeholder};

const YEARS_SHOWN: usize = 5;
const TOP_CATEGORIES: usize = 10;

/// Console run report, printed after the page is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub per_type: Vec<(DocumentType, usize)>,
    pub departments: usize,
    pub categories: usize,
    /// Most recent years first.
    pub per_year: Vec<(String, usize)>,
    /// Most used category names first; ties by name.
    pub top_categories: Vec<(String, usize)>,
}

impl RunSummary {
    pub fn from_aggregate(aggregate: &AggregateResult, facets: &Facets, codes: &CodeTable) -> Self {
        let mut years: BTreeMap<String, usize> = BTreeMap::new();
        for doc in &aggregate.documents {
            let Some(published) = doc.raw.published.as_deref().filter(|p| !p.is_empty()) else {
                continue;
            };
            let year: String = published.chars().take(4).collect();
            *years.entry(year).or_default() += 1;
        }
        let per_year = years.into_iter().rev().take(YEARS_SHOWN).collect();

        let resolver = CodeResolver::new(codes);
        let mut category_use: HashMap<String, usize> = HashMap::new();
        for doc in &aggregate.documents {
            for code in doc.raw.category_codes() {
                *category_use
                    .entry(resolver.resolve(code, Placeholder::Category))
                    .or_default() += 1;
            }
        }
        let mut top_categories: Vec<(String, usize)> = category_use.into_iter().collect();
        top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_categories.truncate(TOP_CATEGORIES);

        Self {
            total: aggregate.documents.len(),
            per_type: DocumentType::ALL
                .into_iter()
                .map(|t| (t, facets.count(t)))
                .collect(),
            departments: facets.departments.len(),
            categories: facets.categories.len(),
            per_year,
            top_categories,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistik:")?;
        writeln!(f, "- Totalt antal dokument: {}", self.total)?;
        for (t, n) in &self.per_type {
            writeln!(f, "  - {}: {n}", t.plural_label())?;
        }
        writeln!(f, "- Antal departement: {}", self.departments)?;
        writeln!(f, "- Antal kategorier: {}", self.categories)?;

        writeln!(f)?;
        writeln!(f, "Dokument per år (senaste {YEARS_SHOWN} åren):")?;
        for (year, n) in &self.per_year {
            writeln!(f, "- {year}: {n} dokument")?;
        }

        writeln!(f)?;
        writeln!(f, "Vanligaste kategorierna:")?;
        for (name, n) in &self.top_categories {
            writeln!(f, "- {name}: {n} dokument")?;
        }
        Ok(())
    }
}
