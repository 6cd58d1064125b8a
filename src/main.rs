//! Reviewflow CLI - batch aggregation and query surface
//!
//! `aggregate` runs the offline pipeline; `flows` and `detail` expose the
//! presenter's two query operations for scripting and debugging. The
//! interactive surface lives in the `reviewflow-dash` binary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use reviewflow_core::{
    aggregate,
    config::PipelineConfig,
    presenter::{FeatureDetail, FilterSelection, Presenter},
    types::ALL_TIME,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reviewflow")]
#[command(about = "App-review clustering pipeline with Sankey-style aggregation")]
#[command(version)]
struct Cli {
    /// Optional TOML config file with pipeline paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the batch pipeline: merge, classify, aggregate, persist
    Aggregate {
        /// App features reference CSV
        #[arg(long)]
        features: Option<PathBuf>,
        /// Raw reviews CSV
        #[arg(long)]
        reviews: Option<PathBuf>,
        /// Labeled training subset CSV
        #[arg(long)]
        labeled: Option<PathBuf>,
        /// Output directory for derived artifacts
        #[arg(long, env = "REVIEWFLOW_DATA_DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Print the flow diagram links for a filter selection
    Flows {
        /// Directory holding the derived artifacts
        #[arg(long, env = "REVIEWFLOW_DATA_DIR")]
        data_dir: Option<PathBuf>,
        /// Filter bucket(s); defaults to "All Time"
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Print the detail summary for one feature
    Detail {
        /// Directory holding the derived artifacts
        #[arg(long, env = "REVIEWFLOW_DATA_DIR")]
        data_dir: Option<PathBuf>,
        /// Full feature title
        #[arg(long)]
        feature: String,
        /// Filter bucket(s); one value is treated as a scalar sentinel
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    match &cli.config {
        Some(path) => Ok(PipelineConfig::from_file(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

/// One value behaves as a scalar sentinel, several as a period list.
fn selection_from_filters(filters: &[String]) -> FilterSelection {
    match filters {
        [] => FilterSelection::Scalar(ALL_TIME.to_string()),
        [single] => FilterSelection::Scalar(single.clone()),
        many => FilterSelection::List(many.to_vec()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reviewflow={}", cli.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = load_config(&cli)?;

    match cli.command {
        Command::Aggregate {
            features,
            reviews,
            labeled,
            out_dir,
        } => {
            if let Some(path) = features {
                config.features = path;
            }
            if let Some(path) = reviews {
                config.reviews = path;
            }
            if let Some(path) = labeled {
                config.labeled = path;
            }
            if let Some(path) = out_dir {
                config.data_dir = path;
            }

            let summary = aggregate::run(&config)?;
            println!(
                "Aggregated {} of {} reviews into {} flow rows across {} clusters",
                summary.reviews_kept,
                summary.reviews_total,
                summary.flow_rows,
                summary.clusters
            );
            println!("Artifacts written to {}", config.resolved_data_dir().display());
        }
        Command::Flows { data_dir, filters } => {
            if let Some(path) = data_dir {
                config.data_dir = path;
            }
            let selected = if filters.is_empty() {
                vec![ALL_TIME.to_string()]
            } else {
                filters
            };

            let presenter = Presenter::load(&config)?;
            let diagram = presenter.flow_diagram(&selected);
            info!("{} links under {:?}", diagram.links.len(), selected);

            println!("{:<44} {:<24} {:>8}", "Feature", "Cluster", "Reviews");
            for link in &diagram.links {
                println!(
                    "{:<44} {:<24} {:>8}",
                    diagram.nodes[link.source], diagram.nodes[link.target], link.value
                );
            }
            if diagram.links.is_empty() {
                println!("(no flows for this selection)");
            }
        }
        Command::Detail {
            data_dir,
            feature,
            filters,
        } => {
            if let Some(path) = data_dir {
                config.data_dir = path;
            }
            let presenter = Presenter::load(&config)?;
            let selection = selection_from_filters(&filters);

            match presenter.feature_detail(&feature, &selection) {
                FeatureDetail::NoData { title } => {
                    println!("No review data for {title}");
                }
                FeatureDetail::Summary(summary) => {
                    println!("{}", summary.title);
                    println!("{}", summary.app_label);
                    println!("{}", summary.release_label);
                    println!("{}", summary.ratio_label);
                    println!("Weekly reviews:");
                    for point in &summary.trend {
                        println!("  {}  {}", point.week_start, point.reviews);
                    }
                }
            }
        }
    }

    Ok(())
}
