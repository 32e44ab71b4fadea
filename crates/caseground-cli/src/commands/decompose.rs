//! Decompose command

use super::read_case_text;
use crate::app::{CaseInput, OutputFormat};
use crate::output::{print_json, terminal};
use anyhow::Result;
use caseground_core::decompose;

pub async fn run(args: CaseInput, format: OutputFormat) -> Result<()> {
    let text = read_case_text(&args)?;
    let queries = decompose(&text);

    match format {
        OutputFormat::Json => print_json(&queries)?,
        OutputFormat::Cli => {
            for (i, query) in queries.iter().enumerate() {
                terminal::print_labeled(
                    &format!("{}. {}", i + 1, query.domain_label),
                    &query.content,
                )?;
            }
        }
    }
    Ok(())
}
