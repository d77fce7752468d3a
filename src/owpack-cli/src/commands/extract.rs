//! Record extraction command

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owpack::{DirectorySource, ExtractionReport, Query};
use std::path::{Path, PathBuf};

use crate::config::Config;

pub fn handle(
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    keys: &[String],
    list_only: bool,
) -> Result<()> {
    let config = Config::load()?;
    let root = config.storage_root(root)?;
    let output = config.output_dir(output);

    let report = run(&root, keys)?;

    for key in &report.unresolved {
        eprintln!("Warning: {} did not match any package", key);
    }
    for failed in &report.failed {
        eprintln!(
            "Warning: Skipped package {}: {}",
            failed.index_content_key, failed.reason
        );
    }

    if list_only {
        for (_, extraction) in &report.packages {
            for file in &extraction.files {
                println!("{}\t{}", file.relative_path(), file.data.len());
            }
        }
        eprintln!("Found {} records", report.file_count());
        return Ok(());
    }

    let written = write_files(&report, &output)?;
    eprintln!(
        "Extracted {} records to {} ({} skipped, {} packages failed)",
        written,
        output.display(),
        report.skipped_count(),
        report.failed.len()
    );

    Ok(())
}

/// Resolve `keys` against the storage root and copy every matched record
fn run(root: &Path, keys: &[String]) -> Result<ExtractionReport> {
    let mut query = Query::from_args(keys)?;

    let source = DirectorySource::open(root)
        .with_context(|| format!("Failed to open storage root {}", root.display()))?;
    let packages = source.packages().with_context(|| {
        format!(
            "Failed to load {}",
            root.join(DirectorySource::PACKAGES_FILE).display()
        )
    })?;

    tracing::info!(
        root = %source.root().display(),
        packages = packages.len(),
        blobs = source.blob_count(),
        query = query.len(),
        "Resolving query"
    );

    Ok(owpack::extract_all(&mut query, &packages, &source)?)
}

/// Write extracted records under `output`, returning the number written
fn write_files(report: &ExtractionReport, output: &Path) -> Result<usize> {
    let pb = ProgressBar::new(report.file_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = 0;
    for (package, extraction) in &report.packages {
        pb.set_message(package.to_string());

        for file in &extraction.files {
            let out_path = output.join(file.relative_path());
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&out_path, &file.data)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;

            written += 1;
            pb.inc(1);
        }

        for skipped in &extraction.skipped {
            pb.println(format!("Skipped {}: {}", skipped.record.key, skipped.reason));
        }
    }

    pb.finish_and_clear();
    Ok(written)
}
