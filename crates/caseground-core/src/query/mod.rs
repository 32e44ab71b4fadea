//! Case text decomposition
//!
//! Splits a free-text case description into per-domain sub-queries so each
//! assessment domain gets its own similarity search.

mod decomposer;

pub use decomposer::*;

use serde::{Deserialize, Serialize};

/// Label used when the case text contains no recognizable domain labels
pub const GENERAL_LABEL: &str = "綜合描述";

/// One domain-labeled sub-query extracted from a case description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainQuery {
    /// Short category name, e.g. `精細動作`
    pub domain_label: String,
    /// Free text following the label
    pub content: String,
}

impl DomainQuery {
    pub fn new(domain_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            domain_label: domain_label.into(),
            content: content.into(),
        }
    }

    /// Fallback query wrapping the entire case text
    pub fn general(case_text: impl Into<String>) -> Self {
        Self::new(GENERAL_LABEL, case_text)
    }

    /// Whether this is the undecomposed fallback query
    pub fn is_general(&self) -> bool {
        self.domain_label == GENERAL_LABEL
    }

    /// Text sent to the embedding provider.
    ///
    /// The label is prepended so the vector lands near stored chunks of the
    /// same assessment domain.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.domain_label, self.content)
    }
}
