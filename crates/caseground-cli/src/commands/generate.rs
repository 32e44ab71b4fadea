//! Generate command

use super::read_case_text;
use crate::app::{GenerateArgs, OutputFormat};
use crate::output::print_json;
use crate::output::terminal::IncrementalPrinter;
use anyhow::Result;
use caseground_core::{Backend, Config, Database, ReportPipeline};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct GenerateOutput {
    backend: Backend,
    output: Option<String>,
}

pub async fn run(
    args: GenerateArgs,
    db: Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let text = read_case_text(&args.input)?;
    let backend = Backend::from(args.backend);
    let pipeline = ReportPipeline::from_config(config, Arc::new(db))?;

    let items = pipeline.generate_report(&text, backend);
    futures::pin_mut!(items);

    match format {
        OutputFormat::Json => {
            let mut last = None;
            while let Some(item) = items.next().await {
                last = Some(item);
            }
            print_json(&GenerateOutput {
                backend,
                output: last,
            })?;
        }
        OutputFormat::Cli => {
            let mut stdout = std::io::stdout();
            let mut printer = IncrementalPrinter::new();
            while let Some(item) = items.next().await {
                printer.push(&item, &mut stdout)?;
            }
            printer.finish(&mut stdout)?;
        }
    }
    Ok(())
}
