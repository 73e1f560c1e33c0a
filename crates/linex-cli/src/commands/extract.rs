//! Extract command - pull line items out of invoice PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use linex_core::extract::vendor::{match_profile, vendor_for_file};
use linex_core::report::{render_markdown, report_path};
use linex_core::{
    convert_to_searchable, extract_line_items, Extraction, LinexConfig, PdfExtractor,
};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input PDF; omit to process all PDFs in the working directory
    input: Option<PathBuf>,

    /// Directory for report files (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,
}

/// Result of processing a single file.
struct FileReport {
    path: PathBuf,
    extraction: Option<Extraction>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    if let Some(ref input) = args.input {
        println!("{} Running extraction in single file mode", style("ℹ").blue());
        let report = process_file(&input, &args, &config);
        print_report(&report);
        return Ok(());
    }

    // Batch mode over every PDF in the working directory.
    let files = super::discover_pdfs(None)?;
    if files.is_empty() {
        anyhow::bail!("No PDF files found in the current directory");
    }

    println!(
        "{} Running extraction in batch mode: found {} files",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(files.len());
    for path in &files {
        let report = process_file(path, &args, &config);
        if let Some(error) = &report.error {
            warn!("{}: {}", path.display(), error);
        }
        reports.push(report);
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    let successful = reports.iter().filter(|r| r.extraction.is_some()).count();
    let failed = reports.len() - successful;

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));
        write_summary(&summary_path, &reports)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        reports.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed).red()
    );

    if failed > 0 {
        println!();
        println!("{}", style("Failed files:").red());
        for report in reports.iter().filter(|r| r.error.is_some()) {
            println!(
                "  - {}: {}",
                report.path.display(),
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_file(path: &Path, args: &ExtractArgs, config: &LinexConfig) -> FileReport {
    let start = Instant::now();
    let result = extract_one(path, args, config);
    let processing_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(extraction) => FileReport {
            path: path.to_path_buf(),
            extraction: Some(extraction),
            error: None,
            processing_time_ms,
        },
        Err(e) => FileReport {
            path: path.to_path_buf(),
            extraction: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn extract_one(
    path: &Path,
    args: &ExtractArgs,
    config: &LinexConfig,
) -> anyhow::Result<Extraction> {
    if !path.exists() {
        anyhow::bail!("file not found: {}", path.display());
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let vendor = vendor_for_file(path, &config.vendors);
    let profile = match_profile(filename, &config.vendors);
    info!("{}: vendor {}, starting extraction", filename, vendor);

    // Make sure we are extracting from a searchable PDF; inputs that are
    // already OCR output extract directly.
    let conversion = convert_to_searchable(path, config)?;
    let source = conversion.path().unwrap_or(path);

    let data = fs::read(source)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    // Positioned content feeds the table strategy; a page we cannot walk
    // still gets the text fallback.
    let page = extractor.first_page_content().unwrap_or_else(|e| {
        debug!("{}: content walk failed ({}), text fallback only", filename, e);
        Default::default()
    });
    let page_text = extractor
        .extract_page_text(1)
        .unwrap_or_else(|_| page.text());

    let extraction = extract_line_items(&page, &page_text, &vendor, profile, &config.extraction)?;

    let report = match &args.output_dir {
        Some(dir) => dir.join(
            report_path(path)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("output_extracted.md")),
        ),
        None => report_path(path),
    };
    fs::write(&report, render_markdown(&extraction.items))?;
    info!(
        "{}: extracted {} items to {}",
        filename,
        extraction.items.len(),
        report.display()
    );

    Ok(extraction)
}

fn print_report(report: &FileReport) {
    match (&report.extraction, &report.error) {
        (Some(extraction), _) => {
            println!(
                "  {} extracted {} items via {} strategy ({} ms)",
                style("✓").green(),
                extraction.items.len(),
                extraction.strategy,
                report.processing_time_ms
            );
        }
        (None, Some(error)) => {
            println!("  {} {}", style("✗").red(), error);
        }
        (None, None) => {}
    }
}

fn write_summary(path: &Path, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor",
        "strategy",
        "items",
        "processing_time_ms",
        "error",
    ])?;

    for report in reports {
        let filename = report
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &report.extraction {
            wtr.write_record([
                filename,
                "success",
                &extraction.vendor,
                extraction.strategy,
                &extraction.items.len().to_string(),
                &report.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                &report.processing_time_ms.to_string(),
                report.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
