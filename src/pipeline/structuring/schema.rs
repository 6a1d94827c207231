use std::sync::LazyLock;

use serde_json::{json, Value};

/// Response schema enforced on the generation capability, in the OpenAPI
/// subset the Generative Language API accepts.
///
/// `explanations` is deliberately absent: the prompt folds explanation into
/// `summary`, and the schema must not demand what the prompt forbids.
pub static REPORT_RESPONSE_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "tests": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "value": { "type": "NUMBER" },
                        "unit": { "type": "STRING" },
                        "status": {
                            "type": "STRING",
                            "enum": ["low", "high", "normal"]
                        },
                        "ref_range": {
                            "type": "OBJECT",
                            "properties": {
                                "low": { "type": "NUMBER" },
                                "high": { "type": "NUMBER" }
                            },
                            "required": ["low", "high"]
                        }
                    },
                    "required": ["name", "value", "unit", "status"]
                }
            },
            "summary": { "type": "STRING" }
        },
        "required": ["tests", "summary"]
    })
});
