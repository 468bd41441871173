mod app;
mod chart;
mod physics;
mod poll;
mod util;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chart::{ChartConfig, ChartSession, KeySelection, Variant};

const DEFAULT_MAX_TICKS: usize = 1_000;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of poll records.
    #[arg(default_value = "data.json")]
    data: PathBuf,

    #[arg(long, value_enum, default_value_t = Variant::Share)]
    variant: Variant,

    /// TOML file overriding the variant's preset settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Attribute key to show first.
    #[arg(long)]
    key: Option<String>,

    /// Settle the layout without a window and print it as JSON.
    #[arg(long)]
    dump: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ChartConfig::load(args.variant, args.config.as_deref())?;

    if args.dump {
        return dump_layout(&args, config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "poll-bubbles",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::BubbleChartApp::new(
                cc,
                args.data.clone(),
                config.clone(),
                args.key.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the chart window: {error}"))
}

fn dump_layout(args: &Args, config: ChartConfig) -> Result<()> {
    let dataset = poll::load_dataset(&args.data)?;
    let mut session = ChartSession::new(dataset, config)?;

    if let Some(key) = &args.key
        && session.select_key(key) == KeySelection::Ignored
    {
        tracing::warn!(key = %key, "requested key is not in the data, dumping the default");
    }

    let ticks = session.run_to_rest(args.max_ticks);
    tracing::info!(ticks, at_rest = !session.layout().is_settling(), "layout settled");

    let json = serde_json::to_string_pretty(&session.snapshot())
        .context("failed to encode layout snapshot")?;
    println!("{json}");
    Ok(())
}
