use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use linkprobe_core::{AppConfig, CrawlConfig};
use linkprobe_engine::CrawlEngine;
use linkprobe_report::{create_report, ReportKind};

use crate::cli::Cli;

/// Merge file config with CLI flags, run the crawl, write the reports.
pub async fn run(app: AppConfig, cli: Cli) -> Result<()> {
    // CLI sentinel -1 falls through to the config file's value.
    let workers = if cli.workers != -1 {
        cli.workers
    } else {
        app.general.workers_num
    };
    let depth = if cli.depth != -1 {
        cli.depth
    } else {
        app.general.max_depth
    };
    let silent = cli.silent || app.general.silent;

    let mut non_crawling: HashSet<String> =
        app.scope.non_crawling_domains.iter().cloned().collect();
    non_crawling.extend(cli.non_crawling_domains.iter().cloned());

    let kind_names = if cli.reports.is_empty() {
        app.general.reports.clone()
    } else {
        cli.reports.clone()
    };
    let mut kinds = Vec::with_capacity(kind_names.len());
    for name in &kind_names {
        kinds.push(name.parse::<ReportKind>().map_err(|e| anyhow!(e))?);
    }
    let mut outputs = cli.outputs.clone();
    while outputs.len() < kinds.len() {
        outputs.push(kinds[outputs.len()].default_output());
    }

    let mut config = CrawlConfig::new(&cli.url, depth, workers, non_crawling)?;
    config.fetch = app.fetch_options();
    config.silent = silent;

    let target_url = config.target_url.clone();
    let workers_num = config.workers_num;

    let summary = CrawlEngine::new(config).run().await?;

    for (kind, output) in kinds.iter().zip(&outputs) {
        let body = create_report(*kind).generate(
            &target_url,
            &summary.broken_links,
            &summary.fetch_error_links,
            &summary.elapsed,
            summary.discovered_count,
            workers_num,
        );
        std::fs::write(output, body).with_context(|| format!("writing report {output}"))?;
        info!(report = %output, kind = %kind, "report written");
    }

    info!(
        "Execution Time: {}  |  Broken/Errors/Visited/Found URLs: {}/{}/{}/{}",
        summary.elapsed,
        summary.broken_links.len(),
        summary.fetch_error_links.len(),
        summary.processed_count,
        summary.discovered_count
    );
    Ok(())
}
