//! Section decomposition of case descriptions
//!
//! A case description is usually written as a list of assessment domains:
//!
//! ```text
//! 精細動作：握筆不穩
//! 2. 粗大動作 無法單腳站立
//! ```
//!
//! [`LabelTokenizer`] recognises these labels; [`SectionDecomposer`] turns
//! the resulting sections into [`DomainQuery`]s and guarantees a fallback
//! query when nothing usable was found.

use super::DomainQuery;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Optional ordinal marker, a 2-6 character ideographic label, then a
    /// colon, horizontal whitespace, or a line break.
    static ref LABEL_RE: Regex = Regex::new(
        r"(?:([0-9０-９]+)[ \t\x{3000}]*[.、．)）][ \t\x{3000}]*)?(\p{Han}{2,6})(?:[ \t\x{3000}]*[:：][ \t\x{3000}]*|[ \t\x{3000}]+|\r?\n)"
    )
    .unwrap();
}

/// A span of case text, optionally introduced by a domain label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// `None` for text that precedes the first label
    pub label: Option<String>,
    pub content: String,
}

/// Strategy that splits case text into sections.
///
/// Implementations only find sections; dropping empty ones and the
/// single-query fallback are handled by [`SectionDecomposer`].
pub trait SectionTokenizer: Send + Sync {
    fn sections(&self, text: &str) -> Vec<Section>;
}

/// Tokenizer for short ideographic domain labels
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelTokenizer;

/// A label match accepted as the start of a section
struct LabelMatch {
    start: usize,
    content_start: usize,
    label: String,
}

impl LabelTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Scan left to right, keeping the earliest and longest acceptable
    /// match at each position. A rejected candidate only advances the scan
    /// by one character so a shorter label inside it can still match.
    fn label_matches(&self, text: &str) -> Vec<LabelMatch> {
        let mut matches = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let Some(caps) = LABEL_RE.captures_at(text, pos) else {
                break;
            };
            let (Some(whole), Some(label)) = (caps.get(0), caps.get(2)) else {
                break;
            };

            let has_ordinal = caps.get(1).is_some();
            let separator = &text[label.end()..whole.end()];
            let colon = separator.contains([':', '：']);

            if is_section_start(text, whole.start(), has_ordinal, colon) {
                matches.push(LabelMatch {
                    start: whole.start(),
                    content_start: whole.end(),
                    label: label.as_str().trim().to_string(),
                });
                pos = whole.end();
            } else {
                pos = next_char_boundary(text, whole.start());
            }
        }

        matches
    }
}

impl SectionTokenizer for LabelTokenizer {
    fn sections(&self, text: &str) -> Vec<Section> {
        let matches = self.label_matches(text);

        let preamble_end = matches.first().map_or(text.len(), |m| m.start);
        let mut sections = vec![Section {
            label: None,
            content: text[..preamble_end].to_string(),
        }];

        for (i, m) in matches.iter().enumerate() {
            let end = matches.get(i + 1).map_or(text.len(), |next| next.start);
            sections.push(Section {
                label: Some(m.label.clone()),
                content: text[m.content_start..end].to_string(),
            });
        }

        sections
    }
}

/// A candidate label starts a section when it is explicitly numbered, when
/// a colon-separated label is not glued to preceding ideographs, or when a
/// whitespace-separated label opens a line.
fn is_section_start(text: &str, start: usize, has_ordinal: bool, colon: bool) -> bool {
    if has_ordinal {
        return true;
    }
    if colon {
        return !text[..start].chars().next_back().is_some_and(is_ideograph);
    }
    at_line_start(text, start)
}

fn at_line_start(text: &str, start: usize) -> bool {
    text[..start]
        .rsplit('\n')
        .next()
        .map_or(true, |tail| {
            tail.chars()
                .all(|c| matches!(c, ' ' | '\t' | '\r' | '\u{3000}'))
        })
}

fn is_ideograph(c: char) -> bool {
    matches!(c as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2FFFF | 0x30000..=0x3134F)
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

/// Splits case text into domain queries using a pluggable tokenizer
pub struct SectionDecomposer {
    tokenizer: Box<dyn SectionTokenizer>,
}

impl Default for SectionDecomposer {
    fn default() -> Self {
        Self::new(Box::new(LabelTokenizer::new()))
    }
}

impl SectionDecomposer {
    pub fn new(tokenizer: Box<dyn SectionTokenizer>) -> Self {
        Self { tokenizer }
    }

    /// Decompose case text into ordered domain queries.
    ///
    /// Sections whose trimmed content is empty are dropped. Text before the
    /// first label becomes a leading general query. When no labeled section
    /// survives, exactly one general query wrapping the whole input is
    /// returned, so the result is never empty for non-empty input.
    pub fn decompose(&self, case_text: &str) -> Vec<DomainQuery> {
        if case_text.is_empty() {
            return Vec::new();
        }

        let sections = self.tokenizer.sections(case_text);
        if !sections.iter().any(|s| s.label.is_some()) {
            return vec![DomainQuery::general(case_text)];
        }

        let queries: Vec<DomainQuery> = sections
            .into_iter()
            .filter_map(|section| {
                let content = section.content.trim();
                if content.is_empty() {
                    return None;
                }
                Some(match section.label {
                    Some(label) => DomainQuery::new(label.trim(), content),
                    None => DomainQuery::general(content),
                })
            })
            .collect();

        if !queries.iter().any(|q| !q.is_general()) {
            tracing::debug!("No labeled section with content, using whole case text");
            return vec![DomainQuery::general(case_text)];
        }

        tracing::debug!("Decomposed case text into {} queries", queries.len());
        queries
    }
}

/// Decompose with the default label tokenizer
pub fn decompose(case_text: &str) -> Vec<DomainQuery> {
    SectionDecomposer::default().decompose(case_text)
}
