use clap::Parser;

#[derive(Parser)]
#[command(name = "linkprobe", about = "Crawl a website and report broken links")]
pub struct Cli {
    /// Website URL to crawl (the trailing slash is significant: it defines
    /// what counts as on-site)
    pub url: String,

    /// Number of parallel workers (-1 = engine default)
    #[arg(short = 't', long = "workers", default_value_t = -1)]
    pub workers: i64,

    /// Maximum crawl depth (-1 = unbounded)
    #[arg(short, long, default_value_t = -1)]
    pub depth: i64,

    /// Report kind to generate (human, json, html); repeat for several
    #[arg(short, long = "report")]
    pub reports: Vec<String>,

    /// Output file per report, matched positionally to --report
    #[arg(short, long = "output")]
    pub outputs: Vec<String>,

    /// Host to HEAD-probe but never fetch bodies from; repeatable
    #[arg(long = "non-crawling-domain")]
    pub non_crawling_domains: Vec<String>,

    /// Suppress the periodic progress line
    #[arg(long)]
    pub silent: bool,

    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,
}
