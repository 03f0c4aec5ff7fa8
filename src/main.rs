use anyhow::{bail, Context, Result};
use bench_plot::axis::ScaleBase;
use bench_plot::chart::{Renderer, SvgRenderer};
use bench_plot::pipeline::{build_chart, ChartConfig};
use bench_plot::record::SourceLocation;
use bench_plot::report::print_series;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bench-plot")]
#[command(about = "Render comparative throughput charts from benchmark CSV logs")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the chart as an SVG file
    Render {
        #[command(flatten)]
        data: DataArgs,

        /// Output SVG path
        #[arg(short, long, default_value = "./output/throughput.svg")]
        output: PathBuf,

        /// Draw grid lines
        #[arg(long)]
        grid: bool,
    },

    /// Print the series and axis plan without drawing
    Inspect {
        #[command(flatten)]
        data: DataArgs,
    },
}

#[derive(Args)]
struct DataArgs {
    /// JSON chart configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV as TAG=PATH, or PATH for an untagged source (repeatable)
    #[arg(short, long = "source")]
    sources: Vec<SourceLocation>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// X axis label
    #[arg(long)]
    x_label: Option<String>,

    /// Y axis label
    #[arg(long)]
    y_label: Option<String>,

    /// Legend title
    #[arg(long)]
    legend_title: Option<String>,

    /// X axis scale: 2, 10 or linear
    #[arg(long)]
    log_base: Option<ScaleBase>,
}

impl DataArgs {
    /// Load the config file (if any) and apply flag overrides
    fn resolve(self) -> Result<ChartConfig> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::from_file(path)?,
            None => ChartConfig::default(),
        };

        if !self.sources.is_empty() {
            config.sources = self.sources;
        }
        if let Some(title) = self.title {
            config.labels.title = title;
        }
        if let Some(x_label) = self.x_label {
            config.labels.x_label = x_label;
        }
        if let Some(y_label) = self.y_label {
            config.labels.y_label = y_label;
        }
        if let Some(legend_title) = self.legend_title {
            config.labels.legend_title = legend_title;
        }
        if let Some(log_base) = self.log_base {
            config.log_base = log_base;
        }

        if config.sources.is_empty() {
            bail!("No input sources: pass --source or list them in --config");
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render { data, output, grid } => {
            let config = data.resolve()?;
            let chart = build_chart(
                &config.sources,
                &config.columns,
                config.labels.clone(),
                config.log_base,
            )
            .context("Failed to build chart")?;

            let mut renderer = SvgRenderer::new(output)
                .with_size(config.width, config.height)
                .with_grid(grid || config.grid);
            renderer.render(&chart)?;
        }
        Commands::Inspect { data } => {
            let config = data.resolve()?;
            let chart = build_chart(
                &config.sources,
                &config.columns,
                config.labels.clone(),
                config.log_base,
            )
            .context("Failed to build chart")?;
            print_series(&chart);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
