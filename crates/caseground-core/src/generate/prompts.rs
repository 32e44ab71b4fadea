//! Prompt templates for the report writer

use serde::Serialize;

/// Instructions for the occupational-therapy report writer
pub const SYSTEM_PROMPT: &str = "你是一位專業的職能治療師 (OT)。
你的任務是根據「使用者提供的主訴與觀察」，高度依賴「歷史案例的分析邏輯」與「資料庫詞彙」，撰寫一份專業的【問題分析】與【總結與建議】。

請嚴格遵守以下規則：
1. **語言**：必須全程使用台灣繁體中文 (Traditional Chinese, Taiwan)。
2. **專業術語**：請嚴格使用參考案例中出現的資料庫名詞 (例如：本體覺、觸覺防禦、精細動作)，不要自行創造或使用不熟悉的別名。
3. **臨床推理**：請模仿參考案例的臨床推理路徑，不要憑空發揮。例如：參考案例如何將「坐不住」連結到「前庭覺」，你就要沿用此邏輯。
4. **建議限制**：產出的建議內容與語意，請勿偏離資料庫資料的範疇。
5. 直接輸出報告內容，不要有開場白或結語。";

/// Sections the report must contain, in order
pub const OUTPUT_SECTIONS: [&str; 2] = ["問題分析", "總結與建議"];

/// Descriptive metadata for the prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptMetadata {
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub created_date: &'static str,
    pub output_sections: Vec<&'static str>,
}

pub fn prompt_metadata() -> PromptMetadata {
    PromptMetadata {
        version: "1.1.0",
        name: "ot-report-writer",
        description: "職能治療報告撰寫：依歷史案例的分析邏輯產出問題分析與總結與建議",
        created_date: "2025-01-15",
        output_sections: OUTPUT_SECTIONS.to_vec(),
    }
}

/// Build the user turn from the grounding context and the current case
pub fn user_prompt(context: &str, case_text: &str) -> String {
    format!(
        "請參考以下「高度相關」的歷史案例（若無相關案例則請保守分析）：
{context}

--------------------------------------------------
【目前個案資料】
{case_text}

請根據上述參考資料的邏輯，撰寫：
1. ### 問題分析 (請使用資料庫中的分析邏輯，並以「條列式」呈現，敘述請精簡扼要)
2. ### 總結與建議 (第一點務必為「療育課程建議」，請模仿資料庫語氣，例如：「綜合以上結果，建議持續職能療育課程」。後續請列出各細項建議，並深入參考資料庫內容，敘述務必詳盡具體，避免過於簡略)

格式規範：
- 只輸出上述兩個區塊，標題使用 Markdown 三級標題 (###)。
- 條列項目使用「-」開頭，不使用表格。

階層規範：
- 每個區塊下最多兩層條列；第二層以兩個空白縮排。
- 細項建議依領域分組，組名使用參考案例中的領域名稱。
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_keywords() {
        for keyword in ["職能治療師", "台灣繁體中文", "專業術語", "臨床推理"] {
            assert!(SYSTEM_PROMPT.contains(keyword), "missing {}", keyword);
        }
    }

    #[test]
    fn test_user_prompt_composition() {
        let context = "【針對「精細動作」的歷史參考資料 (0.82)】\n握筆不穩";
        let case = "家屬表示孩子寫字很慢";
        let prompt = user_prompt(context, case);

        assert!(prompt.contains(context));
        assert!(prompt.contains(case));
        for keyword in ["問題分析", "總結與建議", "格式規範", "階層規範"] {
            assert!(prompt.contains(keyword), "missing {}", keyword);
        }
        assert!(prompt.find(context) < prompt.find(case));
    }

    #[test]
    fn test_metadata() {
        let meta = prompt_metadata();
        assert_eq!(meta.output_sections, vec!["問題分析", "總結與建議"]);
        assert!(!meta.version.is_empty());
    }
}
