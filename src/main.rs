use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::EnvFilter;

use channel_insights::config::{self, OutputFormat};
use channel_insights::ingest::{self, Dataset};
use channel_insights::{filter, report, views, ChannelRecord, FilterCriteria, SubscriberTier};

#[derive(Parser)]
#[command(name = "channel-insights")]
#[command(about = "Channel analytics for existing creators, new creators and marketers", long_about = None)]
struct Cli {
    /// CSV file to analyze instead of the default dataset
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Configuration file (defaults to ./channel-insights.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Country display name, e.g. "United States"
    #[arg(long = "country")]
    countries: Vec<String>,
    #[arg(long)]
    age_min: Option<f64>,
    #[arg(long)]
    age_max: Option<f64>,
}

impl FilterArgs {
    fn criteria(&self, records: &[ChannelRecord], tiers: &[SubscriberTier]) -> FilterCriteria {
        let bounds = filter::age_bounds(records);
        let age_range = match (self.age_min, self.age_max, bounds) {
            (None, None, _) => None,
            (min, max, Some((low, high))) => Some((min.unwrap_or(low), max.unwrap_or(high))),
            (min, max, None) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::MAX))),
        };
        FilterCriteria {
            categories: self.categories.iter().cloned().collect(),
            country_names: self.countries.iter().cloned().collect(),
            age_range,
            tiers: tiers.iter().copied().collect(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load the dataset and report what was ingested
    Summary,
    /// Benchmark one channel against its peers
    Creators {
        /// Channel to analyze (defaults to the first filtered channel)
        #[arg(long)]
        channel: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Category difficulty and geographic success patterns
    Newcomers {
        #[command(flatten)]
        filters: FilterArgs,
        /// Subscriber tier: 0-1K, 1K-10K, 10K-100K, 100K-1M, 1M+
        #[arg(long = "tier", value_parser = parse_tier)]
        tiers: Vec<SubscriberTier>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Cost-effective sponsorship targets
    Marketers {
        /// Channel to compare against the average (defaults to the top ranked)
        #[arg(long)]
        channel: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Write the filtered table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn parse_tier(value: &str) -> Result<SubscriberTier, String> {
    SubscriberTier::parse(value).ok_or_else(|| {
        format!("unknown tier `{value}`; expected one of 0-1K, 1K-10K, 10K-100K, 100K-1M, 1M+")
    })
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render<T: Serialize>(
    format: OutputFormat,
    payload: &T,
    markdown: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Markdown => markdown(payload),
        OutputFormat::Json => serde_json::to_string_pretty(payload)?,
    })
}

fn emit(text: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.log_filter);
    let format = cli.format.unwrap_or(config.format);
    let as_of = Utc::now().date_naive();

    let source = cli.data.as_deref().unwrap_or(config.data_file.as_path());
    let loaded = match &cli.data {
        Some(path) => ingest::read_path(path, as_of).map(Some),
        None => ingest::load_default(&config.data_file, as_of),
    };
    let dataset: Dataset = match loaded {
        Ok(Some(dataset)) => dataset,
        Ok(None) => {
            println!("{}", report::no_data(&config.data_file));
            return Ok(());
        }
        Err(err) => {
            error!(path = %source.display(), error = %err, "channel table could not be loaded");
            println!("{}", report::load_failed(source, &err));
            return Ok(());
        }
    };
    let records = &dataset.records;

    match cli.command {
        Commands::Summary => {
            let text = render(format, &dataset.report, |r| {
                report::load_summary(r, filter::age_bounds(records))
            })?;
            emit(&text, None)?;
        }
        Commands::Creators {
            channel,
            filters,
            out,
        } => {
            let criteria = filters.criteria(records, &[]);
            let state = views::existing_creators(records, &criteria, channel.as_deref())?;
            let text = render(format, &state, report::existing_creators)?;
            emit(&text, out.as_deref())?;
        }
        Commands::Newcomers {
            filters,
            tiers,
            out,
        } => {
            let criteria = filters.criteria(records, &tiers);
            let state = views::new_creators(records, &criteria);
            let text = render(format, &state, report::new_creators)?;
            emit(&text, out.as_deref())?;
        }
        Commands::Marketers {
            channel,
            filters,
            export,
            out,
        } => {
            let criteria = filters.criteria(records, &[]);
            let state = views::marketers(records, &criteria, channel.as_deref())?;
            if let (Some(path), views::ViewState::Ready(view)) = (&export, &state) {
                ingest::export_path(&view.filtered, path)
                    .with_context(|| format!("failed to export {}", path.display()))?;
                eprintln!(
                    "Exported {} rows to {}.",
                    view.filtered.len(),
                    path.display()
                );
            }
            let text = render(format, &state, report::marketers)?;
            emit(&text, out.as_deref())?;
        }
    }

    Ok(())
}
