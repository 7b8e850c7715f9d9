// Entry point and CLI flow.
//
// - `serve` loads the CSV and the region boundaries once, then serves the
//   interactive map page.
// - `report` runs a single comparison headlessly and prints the top regions.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ventas_map::geo::DEFAULT_BOUNDARIES_URL;
use ventas_map::loader::{self, LoadReport};
use ventas_map::server::{self, ServerConfig};
use ventas_map::types::SalesRecord;
use ventas_map::util::{format_int, format_number};
use ventas_map::{output, BoundaryLookup, Dashboard, Metric, Query};

#[derive(Parser)]
#[command(name = "ventas_map")]
#[command(about = "Regional sales choropleth dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args)]
struct Sources {
    /// Sales CSV file
    #[arg(long, default_value = "ventas_por_region.csv")]
    data: PathBuf,

    /// GeoJSON boundaries, as a URL or a local file
    #[arg(long, default_value = DEFAULT_BOUNDARIES_URL)]
    boundaries: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive dashboard server
    Serve {
        #[command(flatten)]
        sources: Sources,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8050")]
        port: u16,
    },

    /// Compute one comparison and print the top regions
    Report {
        #[command(flatten)]
        sources: Sources,

        /// Start year
        #[arg(long)]
        year1: i32,

        /// End year
        #[arg(long)]
        year2: i32,

        /// Month number (1-12)
        #[arg(long)]
        month: u32,

        /// growth, total_sales or total_items
        #[arg(long, default_value = "total_sales")]
        metric: Metric,

        /// Write the map figure JSON here
        #[arg(long)]
        figure_out: Option<PathBuf>,

        /// Write the top regions as CSV here
        #[arg(long)]
        top_out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { sources, host, port } => {
            let dashboard = prepare(&sources).await?;
            println!("Dashboard at http://{}:{} (Ctrl+C to stop)", host, port);
            server::serve(Arc::new(dashboard), ServerConfig { host, port })
                .await
                .context("server stopped")?;
        }
        Commands::Report {
            sources,
            year1,
            year2,
            month,
            metric,
            figure_out,
            top_out,
        } => {
            let dashboard = prepare(&sources).await?;
            let query = Query { year1, year2, month, metric };
            let view = dashboard.compute(&query);

            output::preview_table(
                &ventas_map::figure::title(&query),
                Some("Top 5 Estados"),
                &view.top,
            );
            if let Some(path) = figure_out {
                output::write_json(&path, &view.figure)?;
                println!("(Figure exported to {})", path.display());
            }
            if let Some(path) = top_out {
                output::write_csv(&path, &view.top)?;
                println!("(Top regions exported to {})", path.display());
            }
        }
    }
    Ok(())
}

/// Load the sales file and the boundaries; both failures are fatal.
async fn prepare(sources: &Sources) -> anyhow::Result<Dashboard> {
    let (records, report) = loader::load_sales(&sources.data)
        .with_context(|| format!("failed to load {}", sources.data.display()))?;
    print_load_report(&sources.data, &records, &report);

    let boundaries = BoundaryLookup::load(&sources.boundaries)
        .await
        .with_context(|| format!("failed to load boundaries from {}", sources.boundaries))?;
    tracing::info!("Loaded {} region boundaries", boundaries.len());

    Ok(Dashboard::new(&records, boundaries))
}

fn print_load_report(path: &Path, records: &[SalesRecord], report: &LoadReport) {
    let total_sales: f64 = records.iter().map(|r| r.total_sales).sum();
    println!(
        "Processing {}... ({} rows read, {} loaded, total sales ${})",
        path.display(),
        format_int(report.total_rows),
        format_int(report.loaded_rows),
        format_number(total_sales, 2)
    );
    if report.parse_errors > 0 {
        tracing::warn!(
            "{} rows skipped due to parse/validation errors",
            format_int(report.parse_errors)
        );
    }
    for name in &report.unmapped_regions {
        tracing::warn!("Region name '{}' is not in the normalization table", name);
    }
}
