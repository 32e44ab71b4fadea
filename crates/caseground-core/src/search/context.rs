//! Context assembly for the generator

use super::ContextBlock;
use serde::Serialize;

/// Placed in the prompt when no retrieved case passed the threshold
pub const NO_CONTEXT_MARKER: &str = "（⚠️ 警告：資料庫中未找到相似度 > 0.6 的高相關案例，以下報告將僅基於一般職能治療原則生成，可能不夠精準）";

/// Grounding context handed to the generator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssembledContext {
    Grounded { text: String, block_count: usize },
    NoRelevantContext,
}

impl AssembledContext {
    /// Prompt text; the exact marker for [`AssembledContext::NoRelevantContext`]
    pub fn as_str(&self) -> &str {
        match self {
            AssembledContext::Grounded { text, .. } => text,
            AssembledContext::NoRelevantContext => NO_CONTEXT_MARKER,
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, AssembledContext::Grounded { .. })
    }

    pub fn block_count(&self) -> usize {
        match self {
            AssembledContext::Grounded { block_count, .. } => *block_count,
            AssembledContext::NoRelevantContext => 0,
        }
    }
}

impl std::fmt::Display for AssembledContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn render_block(block: &ContextBlock) -> String {
    format!(
        "【針對「{}」的歷史參考資料 ({:.2})】\n{}",
        block.domain_label, block.similarity, block.text
    )
}

/// Merge retrieved blocks into one grounding document, in the order given
pub fn assemble(blocks: &[ContextBlock]) -> AssembledContext {
    if blocks.is_empty() {
        return AssembledContext::NoRelevantContext;
    }

    let text = blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n");

    AssembledContext::Grounded {
        text,
        block_count: blocks.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(label: &str, similarity: f64, text: &str) -> ContextBlock {
        ContextBlock {
            domain_label: label.to_string(),
            similarity,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_empty_is_marker() {
        let context = assemble(&[]);
        assert_eq!(context, AssembledContext::NoRelevantContext);
        assert_eq!(context.as_str(), NO_CONTEXT_MARKER);
        assert!(!context.is_grounded());
    }

    #[test]
    fn test_header_and_order() {
        let context = assemble(&[
            block("精細動作", 0.8234, "案例A"),
            block("粗大動作", 0.71, "案例B"),
        ]);

        assert_eq!(
            context.as_str(),
            "【針對「精細動作」的歷史參考資料 (0.82)】\n案例A\n\n【針對「粗大動作」的歷史參考資料 (0.71)】\n案例B"
        );
        assert_eq!(context.block_count(), 2);
    }

    #[test]
    fn test_empty_block_text() {
        let context = assemble(&[block("感覺處理", 0.65, "")]);
        assert!(context.is_grounded());
        assert!(context.as_str().ends_with("(0.65)】\n"));
    }
}
