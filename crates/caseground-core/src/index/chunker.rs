//! Structured assessment reports and their chunking
//!
//! Every chunk carries the report's clinical reasoning and recommendations,
//! so a hit on any single domain brings the whole case's reasoning with it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Child identification block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChildInfo {
    #[serde(default)]
    pub name_or_id: Value,
    #[serde(default)]
    pub age_at_assessment: Value,
}

/// One assessed domain; older reports use the alternate field names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentDomain {
    #[serde(default)]
    pub domain: Value,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub qualitative_observation: Value,
    #[serde(default)]
    pub observations: Value,
    #[serde(default)]
    pub quantitative_data: Value,
    #[serde(default)]
    pub scores: Value,
    #[serde(default)]
    pub interpretation: Value,
    #[serde(default)]
    pub findings: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProblemAnalysis {
    #[serde(default)]
    pub clinical_reasoning_text: Value,
    #[serde(default)]
    pub impact_on_function: Value,
    #[serde(default)]
    pub main_issues: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub treatment_goals: Value,
    #[serde(default)]
    pub home_school_strategies: Value,
    #[serde(default)]
    pub suggested_activities: Value,
}

/// An assessment report after structuring into JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredReport {
    #[serde(default)]
    pub child_info: ChildInfo,
    #[serde(default)]
    pub family_concerns: Value,
    #[serde(default)]
    pub assessment_domains: Vec<AssessmentDomain>,
    #[serde(default)]
    pub problem_analysis_structured: ProblemAnalysis,
    #[serde(default)]
    pub problem_analysis: Value,
    #[serde(default)]
    pub recommendations: Recommendations,
    #[serde(default)]
    pub source_file: Option<String>,
}

/// A chunk ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct ReportChunk {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// First value that is present and non-empty
fn either<'a>(primary: &'a Value, fallback: &'a Value) -> &'a Value {
    if is_blank(primary) {
        fallback
    } else {
        primary
    }
}

/// Render a JSON value as prose; lists are joined with `separator`
fn render(value: &Value, separator: &str) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| render(item, separator))
            .collect::<Vec<_>>()
            .join(separator),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| format!("{}: {}", key, render(item, separator)))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn render_or(value: &Value, default: &str) -> String {
    if is_blank(value) {
        default.to_string()
    } else {
        render(value, ", ")
    }
}

impl StructuredReport {
    pub fn child_name(&self) -> String {
        render_or(&self.child_info.name_or_id, "Unknown")
    }

    pub fn child_age(&self) -> String {
        render_or(&self.child_info.age_at_assessment, "Unknown")
    }

    pub fn source(&self) -> &str {
        self.source_file.as_deref().unwrap_or("unknown")
    }

    /// Reasoning and recommendations shared by every chunk of this report
    pub fn reasoning_suffix(&self) -> String {
        let analysis = &self.problem_analysis_structured;
        let recs = &self.recommendations;
        let reasoning = either(&analysis.clinical_reasoning_text, &self.problem_analysis);

        format!(
            "\n--- 專業分析與建議核心 ---\n\
             【臨床推理與問題分析】：\n{}\n\
             【核心問題】：{}\n\
             【治療目標與課程重心】：{}\n\
             【具體建議與建議活動】：{}\n\
             【居家與學校策略建議】：{}",
            render(reasoning, ", "),
            render(&analysis.main_issues, ", "),
            render(&recs.treatment_goals, ", "),
            render(&recs.suggested_activities, ", "),
            render(&recs.home_school_strategies, ", "),
        )
    }
}

/// Split a report into one chunk per assessed domain plus a profile chunk
pub fn chunk_report(report: &StructuredReport) -> Vec<ReportChunk> {
    let name = report.child_name();
    let age = report.child_age();
    let source = report.source();
    let suffix = report.reasoning_suffix();

    let base_metadata = HashMap::from([
        ("child_name".to_string(), name.clone()),
        ("child_age".to_string(), age.clone()),
        ("source_file".to_string(), source.to_string()),
        ("processed_at".to_string(), Utc::now().to_rfc3339()),
    ]);

    let mut chunks = Vec::with_capacity(report.assessment_domains.len() + 1);

    for (idx, domain) in report.assessment_domains.iter().enumerate() {
        let domain_name = render_or(&domain.domain, "未分類");
        let status = render_or(&domain.status, "未知");
        let observations = render(either(&domain.qualitative_observation, &domain.observations), ", ");
        let scores = render(either(&domain.quantitative_data, &domain.scores), ", ");
        let interpretation = render(either(&domain.interpretation, &domain.findings), ", ");

        let text = format!(
            "【領域現狀】個案：{}。評估領域：{}。狀態：{}。\n\
             【觀察與表現】：{}\n\
             【數據與結果】：{}\n\
             【綜合解釋】：{}\n\
             {}",
            name, domain_name, status, observations, scores, interpretation, suffix
        );

        let mut metadata = base_metadata.clone();
        metadata.insert("type".to_string(), "assessment_domain".to_string());
        metadata.insert("domain".to_string(), domain_name);
        metadata.insert("status".to_string(), status);

        chunks.push(ReportChunk {
            id: format!("{}_domain_{}", source, idx),
            text,
            metadata,
        });
    }

    let concerns = render(&report.family_concerns, "、");
    let mut metadata = base_metadata;
    metadata.insert("type".to_string(), "profile".to_string());

    chunks.push(ReportChunk {
        id: format!("{}_profile", source),
        text: format!(
            "【個案主訴】姓名：{}，年齡：{}。主訴期待：{}\n{}",
            name, age, concerns, suffix
        ),
        metadata,
    });

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StructuredReport {
        serde_json::from_str(
            r#"{
                "source_file": "case01.pdf",
                "child_info": {"name_or_id": "小明", "age_at_assessment": "5歲3個月"},
                "family_concerns": ["上課坐不住", "寫字很慢"],
                "assessment_domains": [
                    {
                        "domain": "精細動作",
                        "status": "落後",
                        "observations": "握筆姿勢不成熟",
                        "quantitative_data": {"PDMS-2": "PR 9"},
                        "interpretation": "手部肌力不足"
                    },
                    {"domain": "感覺處理", "qualitative_observation": "對聲音敏感"}
                ],
                "problem_analysis": "整體而言注意力受感覺調節影響",
                "problem_analysis_structured": {"main_issues": ["感覺調節", "精細動作"]},
                "recommendations": {
                    "treatment_goals": "提升握筆穩定度",
                    "suggested_activities": ["夾豆子", "黏土"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_chunk_ids_and_count() {
        let chunks = chunk_report(&sample());
        let ids: Vec<_> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["case01.pdf_domain_0", "case01.pdf_domain_1", "case01.pdf_profile"]
        );
    }

    #[test]
    fn test_domain_chunk_text() {
        let chunks = chunk_report(&sample());
        let first = &chunks[0].text;
        assert!(first.starts_with("【領域現狀】個案：小明。評估領域：精細動作。狀態：落後。"));
        assert!(first.contains("【觀察與表現】：握筆姿勢不成熟"));
        assert!(first.contains("【數據與結果】：PDMS-2: PR 9"));
        assert!(first.contains("【綜合解釋】：手部肌力不足"));

        let second = &chunks[1].text;
        assert!(second.contains("狀態：未知"));
        assert!(second.contains("【觀察與表現】：對聲音敏感"));
    }

    #[test]
    fn test_reasoning_suffix_shared() {
        let report = sample();
        let suffix = report.reasoning_suffix();
        assert!(suffix.contains("整體而言注意力受感覺調節影響"));
        assert!(suffix.contains("【核心問題】：感覺調節, 精細動作"));
        assert!(suffix.contains("【具體建議與建議活動】：夾豆子, 黏土"));
        for chunk in chunk_report(&report) {
            assert!(chunk.text.ends_with(&suffix));
        }
    }

    #[test]
    fn test_profile_chunk() {
        let chunks = chunk_report(&sample());
        let profile = chunks.last().unwrap();
        assert!(profile
            .text
            .starts_with("【個案主訴】姓名：小明，年齡：5歲3個月。主訴期待：上課坐不住、寫字很慢"));
        assert_eq!(profile.metadata["type"], "profile");
        assert!(!profile.metadata.contains_key("domain"));
    }

    #[test]
    fn test_domain_metadata() {
        let chunks = chunk_report(&sample());
        let meta = &chunks[0].metadata;
        assert_eq!(meta["type"], "assessment_domain");
        assert_eq!(meta["domain"], "精細動作");
        assert_eq!(meta["status"], "落後");
        assert_eq!(meta["child_name"], "小明");
        assert_eq!(meta["source_file"], "case01.pdf");
        assert!(meta.contains_key("processed_at"));
    }

    #[test]
    fn test_empty_report_has_profile_only() {
        let chunks = chunk_report(&StructuredReport::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "unknown_profile");
        assert!(chunks[0].text.contains("姓名：Unknown"));
    }
}
