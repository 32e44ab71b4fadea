//! Retrieve command

use super::read_case_text;
use crate::app::{OutputFormat, RetrieveArgs};
use crate::output::{print_json, terminal};
use anyhow::Result;
use caseground_core::{Config, Database, ReportPipeline};
use std::sync::Arc;

pub async fn run(
    args: RetrieveArgs,
    db: Database,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let text = read_case_text(&args.input)?;
    let pipeline = ReportPipeline::from_config(config, Arc::new(db))?;
    let grounding = pipeline.ground_with_budget(&text, args.k).await;

    match format {
        OutputFormat::Json => print_json(&grounding)?,
        OutputFormat::Cli => {
            terminal::print_heading(&format!(
                "{} queries, k={}, {} blocks",
                grounding.queries.len(),
                grounding.k_per_query,
                grounding.context.block_count()
            ))?;
            if !grounding.retrieval.skipped.is_empty() {
                terminal::print_labeled("Skipped:", &grounding.retrieval.skipped.join(", "))?;
            }
            println!();
            println!("{}", grounding.context);
        }
    }
    Ok(())
}
