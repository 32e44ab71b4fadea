//! Ingest command

use crate::app::{IngestArgs, OutputFormat};
use crate::output::print_json;
use crate::progress::ProgressReporter;
use anyhow::Result;
use caseground_core::index::IngestProgress;
use caseground_core::{find_report_files, ingest_reports, Config, Database, OllamaClient};
use std::sync::Arc;

pub async fn run(
    args: IngestArgs,
    db: &Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let files = find_report_files(&args.dir, &args.pattern)?;
    if files.is_empty() {
        eprintln!(
            "No files matching '{}' in {}",
            args.pattern,
            args.dir.display()
        );
    }

    let embedder = OllamaClient::new(config.local.clone())?;
    let reporter = Arc::new(ProgressReporter::new(files.len()));
    let progress = Arc::clone(&reporter);

    let stats = ingest_reports(
        db,
        &embedder,
        &files,
        Some(Box::new(move |event: IngestProgress| {
            let name = event
                .current_file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            progress.update(event.processed_files, &name);
        })),
    )
    .await?;

    if !files.is_empty() {
        reporter.finish();
    }

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Cli => {
            println!("Ingestion complete:");
            println!("  Files:    {}/{}", stats.ingested_files, stats.total_files);
            println!("  Failed:   {}", stats.failed_files);
            println!("  Chunks:   {}", stats.stored_chunks);
        }
    }
    Ok(())
}
