//! OCR command - convert unsearchable PDFs to searchable PDFs.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::{error, info};

use linex_core::{convert_to_searchable, Conversion, LinexConfig};

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Input PDF; omit to process all PDFs in the working directory
    input: Option<PathBuf>,
}

pub async fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    if let Some(input) = args.input {
        println!("{} Running OCR in single file mode", style("ℹ").blue());
        match process_file(&input, &config) {
            Ok(outcome) => report_outcome(&input, &outcome),
            Err(e) => error!("{}: {}", input.display(), e),
        }
        return Ok(());
    }

    // Batch mode: every PDF in the working directory that is not already an
    // OCR output.
    let files = super::discover_pdfs(Some(&config.ocr.marker))?;
    if files.is_empty() {
        anyhow::bail!(
            "No source PDF files found in the current directory (or all have been processed)"
        );
    }

    println!(
        "{} Running OCR in batch mode: found {} files",
        style("ℹ").blue(),
        files.len()
    );

    let mut processed = 0usize;
    for path in &files {
        println!("\nProcessing: {}", path.display());
        match process_file(path, &config) {
            Ok(outcome) => {
                report_outcome(path, &outcome);
                if outcome.path().is_some() {
                    processed += 1;
                }
            }
            Err(e) => error!("{}: {}", path.display(), e),
        }
    }

    println!();
    println!(
        "{} Batch OCR complete: {} of {} files processed or already searchable",
        style("✓").green(),
        processed,
        files.len()
    );

    Ok(())
}

fn process_file(path: &Path, config: &LinexConfig) -> anyhow::Result<Conversion> {
    if !path.exists() {
        anyhow::bail!("file not found: {}", path.display());
    }

    info!("checking {}", path.display());
    Ok(convert_to_searchable(path, config)?)
}

fn report_outcome(path: &Path, outcome: &Conversion) {
    match outcome {
        Conversion::AlreadySearchable(_) => {
            println!("  {} already searchable, skipping OCR", style("✓").green());
        }
        Conversion::Converted(output) => {
            println!(
                "  {} searchable PDF saved as {}",
                style("✓").green(),
                output.display()
            );
        }
        Conversion::Skipped => {
            println!(
                "  {} already processed ({}), skipping",
                style("→").yellow(),
                path.display()
            );
        }
    }
}
