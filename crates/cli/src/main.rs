//! CLI tool that highlights study keywords in PowerPoint slides.

use anyhow::{Context, Result};
use clap::Parser;
use slidemark_core::{
    highlight_presentation, highlighted_output_path, HighlightOptions, Palette, Rgb, SlideEvent,
};
use slidemark_keywords::client::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use slidemark_keywords::{AnthropicClient, ClientConfig};
use slidemark_pptx::PptxDocument;
use std::path::PathBuf;
use std::time::Duration;

/// Highlight study keywords in a PowerPoint file.
#[derive(Parser, Debug)]
#[command(name = "slidemark")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Output file (default: <input>_highlighted.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// API key for the keyword service
    #[arg(long, env = "ANTHROPIC_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,

    /// Number of keywords to request per slide
    #[arg(short = 'k', long, default_value = "5")]
    max_keywords: usize,

    /// Model identifier sent to the keyword service
    #[arg(long, env = "SLIDEMARK_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Keyword service endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Two highlight colors as hex, alternating by keyword rank
    #[arg(long, default_value = "FF0000,009600")]
    colors: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let palette = parse_palette(&args.colors)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| highlighted_output_path(&args.input));

    if args.api_key.is_empty() {
        log::warn!("No API key configured; keyword requests will fail");
    }

    println!("Processing: {}", args.input.display());

    let mut document = PptxDocument::open(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    println!("Found {} slides", document.presentation().slides.len());

    let client = AnthropicClient::new(ClientConfig {
        api_key: args.api_key.clone(),
        endpoint: args.endpoint.clone(),
        model: args.model.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        ..ClientConfig::default()
    });
    let options = HighlightOptions {
        max_keywords: args.max_keywords,
        palette,
    };

    let summary = highlight_presentation(
        document.presentation_mut(),
        &client,
        &options,
        report_progress,
    );

    document
        .save(&output_path)
        .with_context(|| format!("Failed to save {}", output_path.display()))?;

    println!("Complete! Total highlights: {}", summary.total_highlights);
    println!("Saved to: {}", output_path.display());

    Ok(())
}

/// Print one progress line per slide event.
fn report_progress(event: SlideEvent<'_>) {
    match event {
        SlideEvent::NoText { slide } => println!("Slide {}: No text", slide),
        SlideEvent::FetchingKeywords { slide } => println!("Slide {}: Getting keywords...", slide),
        SlideEvent::Keywords { slide, keywords } => {
            println!("Slide {}: Keywords={:?}", slide, keywords)
        }
        SlideEvent::Highlighted { slide, count } => {
            println!("Slide {}: Applied {} highlights", slide, count)
        }
    }
}

/// Parse `FF0000,009600` into a two-color palette.
fn parse_palette(value: &str) -> Result<Palette> {
    let colors = value
        .split(',')
        .map(|c| c.parse::<Rgb>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid --colors value '{}'", value))?;

    match colors.as_slice() {
        [first, second] => Ok(Palette::new(*first, *second)),
        _ => anyhow::bail!("--colors needs exactly two colors, got {}", colors.len()),
    }
}
