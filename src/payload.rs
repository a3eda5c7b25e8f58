//! Upstream generator payloads.
//!
//! The summarization service answers with a JSON object holding the
//! clinician-facing summary and an optional patient-facing note. Stored
//! records keep the four summary sections as separate fields.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::SECTION_MARKER;

/// Heading placed above the patient-facing note.
pub const EXPLANATION_HEADING: &str = "患者様への確認メモ";

/// The generator's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    /// Clinician-facing summary text with markup
    pub summary: String,
    /// Patient-facing note, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Deserialize)]
struct RawPayload {
    summary: Option<String>,
    explanation: Option<String>,
}

impl SummaryPayload {
    /// Create a payload with no explanation.
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            explanation: None,
        }
    }

    /// Attach a patient-facing note.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Parse a raw generator answer.
    ///
    /// Accepts a JSON object, the same object inside a Markdown code fence,
    /// or plain text (taken as the summary).
    pub fn parse(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw.trim());

        if !body.starts_with('{') {
            return Ok(Self::new(body));
        }

        let parsed: RawPayload = serde_json::from_str(body)?;
        let summary = parsed
            .summary
            .ok_or_else(|| Error::InvalidPayload("missing \"summary\" field".to_string()))?;

        Ok(Self {
            summary,
            explanation: parsed.explanation.filter(|e| !e.trim().is_empty()),
        })
    }

    /// The text to render, optionally followed by the explanation section.
    pub fn to_document_text(&self, include_explanation: bool) -> String {
        match &self.explanation {
            Some(explanation) if include_explanation => format!(
                "{}\n\n{}{}\n{}",
                self.summary.trim_end(),
                SECTION_MARKER,
                EXPLANATION_HEADING,
                explanation.trim()
            ),
            _ => self.summary.clone(),
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => return text,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// A stored summary split into its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// 主訴
    #[serde(default)]
    pub chief_complaint: String,
    /// 現病歴
    #[serde(default)]
    pub history: String,
    /// 随伴症状
    #[serde(default)]
    pub symptoms: String,
    /// 既往歴・服薬
    #[serde(default)]
    pub background: String,
}

impl SummaryRecord {
    /// Section labels in display order.
    pub const SECTION_LABELS: [&'static str; 4] = ["主訴", "現病歴", "随伴症状", "既往歴・服薬"];

    /// Rebuild the printable text with one heading per section.
    pub fn to_document_text(&self) -> String {
        let bodies = [
            &self.chief_complaint,
            &self.history,
            &self.symptoms,
            &self.background,
        ];
        Self::SECTION_LABELS
            .iter()
            .zip(bodies)
            .map(|(label, body)| format!("{}{}\n{}", SECTION_MARKER, label, body.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let raw = r#"{"summary": "■ 主訴\n- 腹痛", "explanation": "お腹の痛みを伝えます"}"#;
        let payload = SummaryPayload::parse(raw).unwrap();
        assert_eq!(payload.summary, "■ 主訴\n- 腹痛");
        assert_eq!(payload.explanation.as_deref(), Some("お腹の痛みを伝えます"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"summary\": \"x\"}\n```";
        let payload = SummaryPayload::parse(raw).unwrap();
        assert_eq!(payload, SummaryPayload::new("x"));
    }

    #[test]
    fn test_parse_plain_text() {
        let payload = SummaryPayload::parse("  ■ 主訴\n発熱  ").unwrap();
        assert_eq!(payload.summary, "■ 主訴\n発熱");
        assert!(payload.explanation.is_none());
    }

    #[test]
    fn test_parse_missing_summary() {
        let err = SummaryPayload::parse(r#"{"explanation": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[test]
    fn test_parse_broken_json() {
        let err = SummaryPayload::parse(r#"{"summary": "#).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
    }

    #[test]
    fn test_blank_explanation_is_none() {
        let payload = SummaryPayload::parse(r#"{"summary": "a", "explanation": "  "}"#).unwrap();
        assert!(payload.explanation.is_none());
    }

    #[test]
    fn test_document_text_with_explanation() {
        let payload = SummaryPayload::new("■ 主訴\n腹痛\n").with_explanation("確認してください");
        assert_eq!(
            payload.to_document_text(true),
            "■ 主訴\n腹痛\n\n■ 患者様への確認メモ\n確認してください"
        );
        assert_eq!(payload.to_document_text(false), "■ 主訴\n腹痛\n");
    }

    #[test]
    fn test_record_document_text() {
        let record = SummaryRecord {
            chief_complaint: "腹痛".into(),
            history: "昨日から".into(),
            symptoms: "発熱".into(),
            background: "なし".into(),
        };
        assert_eq!(
            record.to_document_text(),
            "■ 主訴\n腹痛\n\n■ 現病歴\n昨日から\n\n■ 随伴症状\n発熱\n\n■ 既往歴・服薬\nなし"
        );
    }

    #[test]
    fn test_record_from_json() {
        let record: SummaryRecord = serde_json::from_str(r#"{"chief_complaint": "咳"}"#).unwrap();
        assert_eq!(record.chief_complaint, "咳");
        assert!(record.history.is_empty());
    }
}
