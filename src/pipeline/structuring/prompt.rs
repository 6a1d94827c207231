/// Fixed instructions prepended to every report. The response schema is
/// enforced by the capability, so the prompt only has to carry policy.
pub const REPORT_INSTRUCTIONS: &str = r#"
You are a medical data processor. The text below was extracted from a scanned
medical report by OCR. Convert it into a JSON object that matches the
provided response schema.

RULES:
1. OCR CORRECTION: The text may contain recognition errors (e.g. "Hemglobin"
   for "Hemoglobin"). Use medical knowledge to correct misspelled clinical terms.
2. NAME NORMALIZATION: Use the conventional clinical name for each test as it
   appears in the source. Keep initialisms as initialisms: if the report says
   "WBC", the name is "WBC", not "White Blood Cell Count".
3. STATUS: Classify every result as "low", "high" or "normal". When the report
   gives no reference range, use standard adult reference ranges.
4. SUMMARY: Write exactly one short, patient-friendly paragraph. Mention the key
   findings, abnormal results first, and what they may generally indicate
   (e.g. "A high white blood cell count can occur with infections.").
   Put all explanation into this paragraph. Do not produce a separate list of
   explanations.
5. GROUNDING: Do NOT include any test that is not written in, or clearly
   implied by, the source text. Never invent values.
6. Output a single valid JSON object and nothing else.
"#;

/// Build the structuring prompt for one report. The OCR text is embedded
/// verbatim between delimiter lines.
pub fn build_report_prompt(raw_text: &str) -> String {
    format!(
        r#"{REPORT_INSTRUCTIONS}
OCR TEXT:
---
{raw_text}
---
"#
    )
}
