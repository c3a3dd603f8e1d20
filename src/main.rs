//! page-flow CLI: paginate pre-measured blocks from a JSON file
//! The main interface is through WASM bindings.

use anyhow::{bail, Context, Result};
use clap::Parser;
use page_flow::measure::BandSizing;
use page_flow::{MeasuredBlock, PagePreset, PaginationConfig, Paginator, ReflowOutcome, StaticMeasurer};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "page-flow", about = "Paginate measured blocks into pages", version)]
struct Cli {
    /// Input JSON file: { config, blocks: [{id, height}], headerHeight, footerHeight }
    input: PathBuf,

    /// Page size preset, overriding the one in the config
    #[arg(long)]
    preset: Option<PagePreset>,

    /// Print the overlay layout instead of the pagination result
    #[arg(long)]
    overlay: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Input {
    #[serde(default)]
    config: PaginationConfig,
    blocks: Vec<MeasuredBlock>,
    /// Rendered header height; the configured minimum when absent
    header_height: Option<f32>,
    footer_height: Option<f32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let mut input: Input = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;

    if let Some(preset) = cli.preset {
        input.config.preset = Some(preset.name().to_string());
    }

    let mut paginator = Paginator::new(&input.config).context("invalid configuration")?;

    let mut measurer = StaticMeasurer::new().with_bands(
        BandSizing::Fixed(input.header_height.unwrap_or(0.0)),
        BandSizing::Fixed(input.footer_height.unwrap_or(0.0)),
    );
    for block in &input.blocks {
        measurer.set_block(block.id, block.height);
    }
    paginator.set_blocks(input.blocks.iter().map(|block| block.id).collect());

    match paginator.reflow(&mut measurer) {
        ReflowOutcome::Applied { generation, page_count } => {
            tracing::debug!(generation, page_count, "paginated");
        }
        ReflowOutcome::Skipped(err) => bail!("pagination failed: {err}"),
        outcome => bail!("unexpected reflow outcome: {outcome:?}"),
    }

    let json = match (cli.overlay, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&paginator.overlay())?,
        (true, false) => serde_json::to_string(&paginator.overlay())?,
        (false, true) => serde_json::to_string_pretty(paginator.result())?,
        (false, false) => serde_json::to_string(paginator.result())?,
    };
    println!("{json}");

    Ok(())
}
