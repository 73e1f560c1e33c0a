//! CLI subcommands.

pub mod extract;
pub mod ocr;

use std::path::{Path, PathBuf};

use glob::glob;

use linex_core::LinexConfig;

/// Load configuration from an explicit path, or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LinexConfig> {
    match config_path {
        Some(path) => Ok(LinexConfig::from_file(Path::new(path))?),
        None => Ok(LinexConfig::default()),
    }
}

/// Candidate PDFs in the working directory, optionally excluding files that
/// already carry the OCR marker.
pub fn discover_pdfs(exclude_marker: Option<&str>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = glob("*.pdf")?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let Some(marker) = exclude_marker else {
                return true;
            };
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|name| !name.contains(marker))
                .unwrap_or(true)
        })
        .collect();

    files.sort();
    Ok(files)
}
