//! Status command

use crate::app::OutputFormat;
use crate::output::{print_json, terminal};
use anyhow::Result;
use caseground_core::generate::{prompt_metadata, PromptMetadata};
use caseground_core::{Config, Database, DatabaseStats};
use serde::Serialize;

#[derive(Serialize)]
struct ServiceStatus<'a> {
    ollama_url: &'a str,
    embedding_model: &'a str,
    generation_model: &'a str,
    cloud_url: &'a str,
    cloud_model: &'a str,
    cloud_api_key: Option<String>,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    database: String,
    index: DatabaseStats,
    services: ServiceStatus<'a>,
    prompt: PromptMetadata,
    system_prompt_overridden: bool,
}

pub async fn run(db: &Database, config: &Config, format: OutputFormat) -> Result<()> {
    let report = StatusReport {
        database: Database::default_path().display().to_string(),
        index: db.get_stats()?,
        services: ServiceStatus {
            ollama_url: &config.local.url,
            embedding_model: &config.local.embedding_model,
            generation_model: &config.local.generation_model,
            cloud_url: &config.cloud.url,
            cloud_model: &config.cloud.model,
            cloud_api_key: config.cloud.masked_api_key(),
        },
        prompt: prompt_metadata(),
        system_prompt_overridden: config.prompts.system.is_some(),
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Cli => {
            let index = &report.index;
            let services = &report.services;

            terminal::print_heading("Index")?;
            println!("  Database:      {}", report.database);
            println!("  Documents:     {}", index.document_count);
            println!("  Embedded:      {}", index.embedded_count);
            for model in &index.models {
                println!("  Model:         {} ({} dims)", model.model, model.dimensions);
            }
            println!();

            terminal::print_heading("Services")?;
            println!("  Ollama:        {}", services.ollama_url);
            println!("  Embedding:     {}", services.embedding_model);
            println!("  Generation:    {}", services.generation_model);
            println!("  Cloud:         {}", services.cloud_url);
            println!("  Cloud model:   {}", services.cloud_model);
            println!(
                "  API key:       {}",
                services.cloud_api_key.as_deref().unwrap_or("not set")
            );
            println!();

            terminal::print_heading("Prompt")?;
            println!("  Template:      {} v{}", report.prompt.name, report.prompt.version);
            println!("  Sections:      {}", report.prompt.output_sections.join(", "));
            if report.system_prompt_overridden {
                println!("  System prompt: overridden in config");
            }

            if let Some(stored) = index.models.first() {
                if !index.models.iter().any(|m| m.model == config.local.embedding_model) {
                    println!();
                    terminal::print_labeled(
                        "Warning:",
                        &format!(
                            "index built with {} but queries use {}",
                            stored.model, config.local.embedding_model
                        ),
                    )?;
                }
            }
        }
    }
    Ok(())
}
