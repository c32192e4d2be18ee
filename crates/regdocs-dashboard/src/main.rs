mod aggregate;
mod config;
mod error;
mod facets;
mod fetch;
mod model;
mod normalize;
mod report;
mod resolver;
mod search;
mod summary;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use g0v_common::http::JsonClient;
use report::html::RenderOptions;
use summary::RunSummary;

/// One run: fetch everything, aggregate, write the page (and optionally a CSV).
///
/// A fetch failure aborts before anything is written; there is no partial
/// report.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting regdocs-dashboard");

    let config = Config::from_env()?;
    info!(
        base_url = %config.base_url,
        output = %config.output_path.display(),
        csv = config.csv_output.is_some(),
        "configuration loaded"
    );

    let client = JsonClient::new(config.http.clone())?;
    let (codes, sources) = fetch::fetch_sources(&client, &config.endpoints())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "fetch failed, aborting run"))?;

    let result = aggregate::aggregate(&sources, &codes);
    let facets = facets::build_facets(&result);
    info!(
        documents = facets.total(),
        departments = result.departments.len(),
        categories = result.categories.len(),
        "aggregation complete"
    );

    let options = RenderOptions {
        generated_at: Utc::now().with_timezone(&config.utc_offset),
        site_base: &config.site_base,
    };
    let html = report::html::render_html(&result, &facets, &codes, &options)?;
    report::write_report(&config.output_path, &html)?;

    if let Some(csv_path) = &config.csv_output {
        let mut selected = search::filter(&result.documents, &codes, &config.csv_query);
        search::sort_by_published_desc(&mut selected);
        info!(
            selected = selected.len(),
            filtered = !config.csv_query.is_empty(),
            "exporting csv"
        );
        let csv = report::csv::render_csv(&selected, &codes, &config.site_base);
        report::write_report(csv_path, &csv)?;
    }

    println!("Dashboard skapad: {}", config.output_path.display());
    println!();
    print!("{}", RunSummary::from_aggregate(&result, &facets, &codes));
    Ok(())
}
