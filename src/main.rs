// Copyright 2026 d4-harvester Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use d4_harvester::config::HarvestConfig;
use d4_harvester::model::Category;
use d4_harvester::pipeline::run_harvest;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "d4harvest",
    about = "Harvest Wowhead's Diablo 4 database into static JSON files",
    version,
    after_help = "Examples:\n  \
        d4harvest items --limit 10\n  \
        d4harvest skills aspects\n  \
        d4harvest bosses\n  \
        d4harvest --all --limit 20"
)]
struct Cli {
    /// Categories to harvest (items, skills, aspects, bosses); all four when omitted
    categories: Vec<Category>,

    /// Harvest all categories
    #[arg(long, short)]
    all: bool,

    /// Cap the number of entities harvested per category (ignored for bosses)
    #[arg(long, short)]
    limit: Option<usize>,

    /// Output directory for the category JSON files
    #[arg(long, default_value = "public/data")]
    out: PathBuf,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long, short)]
    quiet: bool,
}

fn init_tracing(cli: &Cli) {
    let default_directive = if cli.quiet {
        "d4_harvester=warn"
    } else if cli.verbose {
        "d4_harvester=debug"
    } else {
        "d4_harvester=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse().unwrap()),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let categories: Vec<Category> = if cli.all || cli.categories.is_empty() {
        Category::ALL.to_vec()
    } else {
        // Keep caller order, first mention wins.
        let mut seen = Vec::new();
        for cat in &cli.categories {
            if !seen.contains(cat) {
                seen.push(*cat);
            }
        }
        seen
    };

    let config = HarvestConfig {
        output_dir: cli.out.clone(),
        ..HarvestConfig::default()
    };

    info!(
        categories = %categories.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", "),
        limit = ?cli.limit,
        out = %config.output_dir.display(),
        "starting harvest"
    );

    match run_harvest(&categories, cli.limit, config).await {
        Ok(summary) => {
            for outcome in &summary.outcomes {
                match &outcome.file {
                    Some(path) => println!(
                        "  {}: {} records -> {}",
                        outcome.category,
                        outcome.records,
                        path.display()
                    ),
                    None => println!("  {}: no records, file skipped", outcome.category),
                }
            }
            println!("Done: {} records total.", summary.total_records());
            Ok(())
        }
        Err(e) => {
            error!(error = format!("{e:#}"), "harvest failed");
            std::process::exit(1);
        }
    }
}
