use std::collections::BTreeSet;
use std::convert::identity;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::error::AppError;
use crate::fetch::{Endpoints, DEFAULT_BASE_URL};
use crate::model::DocumentType;
use crate::search::DocumentQuery;
use g0v_common::http::JsonClientConfig;

pub const DEFAULT_SITE_BASE: &str = "https://www.regeringen.se";
const DEFAULT_OUTPUT: &str = "index.html";
const DEFAULT_UTC_OFFSET_HOURS: i32 = 2;

/// Run configuration, read once from the environment.
///
/// Every variable is optional. A variable that is set but cannot be parsed is
/// an error rather than falling back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the g0v.se mirror serving codes and document lists.
    pub base_url: String,
    /// Prefix for document links, which are site-relative upstream.
    pub site_base: String,
    pub output_path: PathBuf,
    /// When set, a CSV export is written here as well.
    pub csv_output: Option<PathBuf>,
    pub csv_query: DocumentQuery,
    /// Fixed offset applied to the report timestamp.
    pub utc_offset: FixedOffset,
    pub http: JsonClientConfig,
}

impl Config {
    /// Optional:
    /// - `G0V_BASE_URL` (default: "https://g0v.se")
    /// - `REGDOCS_SITE_BASE` (default: "https://www.regeringen.se")
    /// - `REGDOCS_OUTPUT` (default: "index.html")
    /// - `REGDOCS_CSV_OUTPUT`, plus `REGDOCS_CSV_SEARCH`, `REGDOCS_CSV_TYPES`,
    ///   `REGDOCS_CSV_DEPARTMENTS`, `REGDOCS_CSV_CATEGORIES` to filter it
    /// - `REGDOCS_UTC_OFFSET_HOURS` (default: 2)
    /// - `G0V_TIMEOUT_SECS`, `G0V_MAX_RETRIES`, `G0V_RETRY_INITIAL_MS`,
    ///   `G0V_RETRY_MAX_MS`, `G0V_MAX_ERROR_BODY_BYTES`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let defaults = JsonClientConfig::default();
        let http = JsonClientConfig {
            timeout: parse_or(&var, "G0V_TIMEOUT_SECS", defaults.timeout, Duration::from_secs)?,
            max_retries: parse_or(&var, "G0V_MAX_RETRIES", defaults.max_retries, identity)?,
            initial_backoff: parse_or(
                &var,
                "G0V_RETRY_INITIAL_MS",
                defaults.initial_backoff,
                Duration::from_millis,
            )?,
            max_backoff: parse_or(&var, "G0V_RETRY_MAX_MS", defaults.max_backoff, Duration::from_millis)?,
            max_error_body_bytes: parse_or(
                &var,
                "G0V_MAX_ERROR_BODY_BYTES",
                defaults.max_error_body_bytes,
                identity,
            )?,
            ..defaults
        };

        let offset_hours: i32 = parse_or(&var, "REGDOCS_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS, identity)?;
        let utc_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!("REGDOCS_UTC_OFFSET_HOURS out of range: {offset_hours}"))
            })?;

        let types = var("REGDOCS_CSV_TYPES")
            .map(|raw| {
                split_list(&raw)
                    .iter()
                    .map(|label| DocumentType::from_str(label))
                    .collect::<Result<BTreeSet<_>, _>>()
            })
            .transpose()
            .map_err(|e| AppError::Config(format!("REGDOCS_CSV_TYPES: {e}")))?
            .unwrap_or_default();

        let csv_query = DocumentQuery {
            text: var("REGDOCS_CSV_SEARCH").unwrap_or_default(),
            types,
            departments: var("REGDOCS_CSV_DEPARTMENTS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            categories: var("REGDOCS_CSV_CATEGORIES")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
        };

        Ok(Self {
            base_url: var("G0V_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            site_base: var("REGDOCS_SITE_BASE")
                .unwrap_or_else(|| DEFAULT_SITE_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            output_path: PathBuf::from(var("REGDOCS_OUTPUT").unwrap_or_else(|| DEFAULT_OUTPUT.to_string())),
            csv_output: var("REGDOCS_CSV_OUTPUT").map(PathBuf::from),
            csv_query,
            utc_offset,
            http,
        })
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::from_base(&self.base_url)
    }
}

fn parse_or<V, T, R, M>(var: &V, name: &str, default: R, map: M) -> Result<R, AppError>
where
    V: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
    M: FnOnce(T) -> R,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(map)
            .map_err(|e| AppError::Config(format!("{name}={raw}: {e}"))),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
