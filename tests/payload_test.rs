//! Rendering generator payloads and stored records.

use std::sync::Arc;

use medsum::{
    inspect_pdf, Error, FontResolution, RenderOptions, SummaryPayload, SummaryRecord,
    SummaryRenderer,
};

fn renderer(include_explanation: bool) -> SummaryRenderer {
    SummaryRenderer::with_fonts(Arc::new(FontResolution::builtin()))
        .with_options(RenderOptions::new().with_explanation(include_explanation))
}

const GENERATOR_ANSWER: &str = r###"```json
{
  "summary": "## 【患者サマリー】（医師提示用）\n**■ 主訴（一番辛いこと）**\n* **38.5度**の発熱\n* 咳\n**■ 現病歴**\n昨日の夕方から",
  "explanation": "発熱と咳について医師に伝えます。"
}
```"###;

#[test]
fn test_generator_answer_structure() {
    let payload = SummaryPayload::parse(GENERATOR_ANSWER).unwrap();
    let layout = renderer(false).layout(&payload.to_document_text(false), "A4");

    let doc = renderer(false).render_layout(&layout).unwrap();
    assert_eq!(doc.stats.heading_count, 3);
    assert_eq!(doc.stats.bullet_count, 2);
    assert_eq!(doc.stats.body_count, 1);
    assert_eq!(doc.stats.bold_span_count, 1);
}

#[test]
fn test_explanation_is_optional() {
    let payload = SummaryPayload::parse(GENERATOR_ANSWER).unwrap();

    let with = renderer(true).render_payload(&payload, "B5").unwrap();
    let without = renderer(false).render_payload(&payload, "B5").unwrap();

    assert_eq!(with.stats.heading_count, without.stats.heading_count + 1);
    assert_eq!(with.stats.body_count, without.stats.body_count + 1);
}

#[test]
fn test_plain_text_payload() {
    let doc = medsum::render_payload("■ 主訴\n- 腹痛", "Receipt").unwrap();
    let report = inspect_pdf(&doc.bytes).unwrap();
    assert_eq!(report.page_count, 1);
    assert_eq!(doc.stats.heading_count, 1);
}

#[test]
fn test_invalid_payload_is_not_a_generation_failure() {
    let err = medsum::render_payload(r#"{"explanation": "only"}"#, "A4").unwrap_err();
    assert!(matches!(err, Error::InvalidPayload(_)));
    assert!(!err.is_generation_failure());
}

#[test]
fn test_record_round_trip() {
    let json = r#"{
        "chief_complaint": "腹痛",
        "history": "昨日から",
        "symptoms": "- 発熱\n- 嘔気",
        "background": "高血圧で服薬中"
    }"#;
    let record: SummaryRecord = serde_json::from_str(json).unwrap();
    let doc = renderer(false).render_record(&record, "A4").unwrap();

    assert_eq!(doc.stats.heading_count, 4);
    assert_eq!(doc.stats.bullet_count, 2);
    assert_eq!(doc.stats.body_count, 3);
    let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
    assert_eq!(doc.dated_filename(date), "medical_summary_2025-01-20.pdf");
}
