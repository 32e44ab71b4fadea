//! CLI command handlers

pub mod decompose;
pub mod generate;
pub mod ingest;
pub mod retrieve;
pub mod status;

use crate::app::CaseInput;
use anyhow::{Context, Result};
use std::io::Read;

/// Resolve case text from the argument, the file, or stdin
pub fn read_case_text(input: &CaseInput) -> Result<String> {
    if let Some(ref text) = input.text {
        return Ok(text.clone());
    }
    if let Some(ref path) = input.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read case file {}", path.display()));
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read case text from stdin")?;
    Ok(text)
}
