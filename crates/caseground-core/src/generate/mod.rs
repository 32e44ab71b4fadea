//! Grounded report generation
//!
//! Provides:
//! - Prompt templates for the report writer
//! - A dispatcher over the local and hosted streaming backends
//! - Normalisation of both into cumulative report strings

mod dispatcher;
mod prompts;

pub use dispatcher::*;
pub use prompts::*;

use crate::error::CasegroundError;
use crate::search::AssembledContext;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text-generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Locally hosted model behind Ollama
    #[default]
    Local,
    /// Hosted model behind the Anthropic API
    Cloud,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Local => write!(f, "local"),
            Backend::Cloud => write!(f, "cloud"),
        }
    }
}

impl FromStr for Backend {
    type Err = CasegroundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "ollama" => Ok(Backend::Local),
            "cloud" | "anthropic" | "claude" => Ok(Backend::Cloud),
            other => Err(CasegroundError::InvalidInput(format!(
                "unknown backend '{}', expected local or cloud",
                other
            ))),
        }
    }
}

/// Everything one generation call needs
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instructions: String,
    pub grounding: AssembledContext,
    pub case_text: String,
    pub backend: Backend,
}

impl GenerationRequest {
    /// Request using the built-in system instructions
    pub fn new(case_text: impl Into<String>, grounding: AssembledContext, backend: Backend) -> Self {
        Self {
            system_instructions: SYSTEM_PROMPT.to_string(),
            grounding,
            case_text: case_text.into(),
            backend,
        }
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = instructions.into();
        self
    }

    /// User turn combining the grounding context and the current case
    pub fn user_prompt(&self) -> String {
        user_prompt(self.grounding.as_str(), &self.case_text)
    }
}
