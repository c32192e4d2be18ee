//! Fetch collaborator: the code table plus one list per document type.
//!
//! All six requests run concurrently. The first failure aborts the whole run;
//! no partial data ever reaches the aggregator.
use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::{CodeTable, DocumentType, RawDocument, SourceLists};
use g0v_common::http::JsonClient;

pub const DEFAULT_BASE_URL: &str = "https://g0v.se";
const CODES_PATH: &str = "/api/codes.json";

pub fn source_path(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::Kommittedirektiv => "/rattsliga-dokument/kommittedirektiv.json",
        DocumentType::DsPm => "/rattsliga-dokument/departementsserien-och-promemorior.json",
        DocumentType::Sou => "/rattsliga-dokument/statens-offentliga-utredningar.json",
        DocumentType::Regeringsuppdrag => "/regeringsuppdrag.json",
        DocumentType::Rapport => "/rapporter.json",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub codes: String,
    pub documents: BTreeMap<DocumentType, String>,
}

impl Endpoints {
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            codes: format!("{base}{CODES_PATH}"),
            documents: DocumentType::ALL
                .into_iter()
                .map(|t| (t, format!("{base}{}", source_path(t))))
                .collect(),
        }
    }
}

pub async fn fetch_sources(
    client: &JsonClient,
    endpoints: &Endpoints,
) -> Result<(CodeTable, SourceLists), AppError> {
    let codes = async {
        let table: CodeTable = client.get_json(&endpoints.codes).await?;
        if table.is_empty() {
            warn!(url = %endpoints.codes, "code table is empty; every code will render as a placeholder");
        }
        info!(codes = table.len(), "fetched code table");
        Ok::<_, AppError>(table)
    };

    let lists = try_join_all(endpoints.documents.iter().map(|(&document_type, url)| async move {
        let docs: Vec<RawDocument> = client.get_json(url).await?;
        info!(document_type = %document_type, documents = docs.len(), "fetched document list");
        Ok::<_, AppError>((document_type, docs))
    }));

    let (codes, lists) = tokio::try_join!(codes, lists)?;
    Ok((codes, lists.into_iter().collect()))
}
