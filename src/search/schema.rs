//! Output contracts handed to the model alongside each prompt.

use serde_json::json;

use crate::llm::OutputSchema;

fn verse_object() -> serde_json::Value {
    json!({
        "type": "object",
        "nullable": true,
        "description": "The retrieved passage, or null when no passage can be confidently identified.",
        "properties": {
            "text": {"type": "string", "description": "The exact text of the passage."},
            "source": {"type": "string", "description": "Book, chapter and verse, or work and section."},
            "tradition": {"type": "string", "description": "The religious or philosophical tradition it belongs to."}
        },
        "required": ["text", "source", "tradition"]
    })
}

/// `{"verse": Verse | null}`
pub fn verse() -> OutputSchema {
    OutputSchema {
        name: "verse",
        schema: json!({
            "type": "object",
            "properties": {"verse": verse_object()},
            "required": ["verse"]
        }),
    }
}

pub fn analysis() -> OutputSchema {
    OutputSchema {
        name: "analysis",
        schema: json!({
            "type": "object",
            "properties": {
                "analysis": {"type": "string", "description": "The meaning of the passage in its original context."},
                "insights": {"type": "string", "description": "Key insights and lessons drawn from the passage."},
                "reflection": {"type": "string", "description": "A secular or philosophical reflection on its themes."}
            },
            "required": ["analysis", "insights", "reflection"]
        }),
    }
}

/// `{"parallels": [string]}`
pub fn parallels() -> OutputSchema {
    OutputSchema {
        name: "parallels",
        schema: json!({
            "type": "object",
            "properties": {
                "parallels": {
                    "type": "array",
                    "description": "Each entry is one quote with its full reference and tradition.",
                    "items": {"type": "string"}
                }
            },
            "required": ["parallels"]
        }),
    }
}

pub fn fact() -> OutputSchema {
    OutputSchema {
        name: "fact",
        schema: json!({
            "type": "object",
            "properties": {
                "fact": {"type": "string", "description": "One lesser-known fact about world religion or philosophy."}
            },
            "required": ["fact"]
        }),
    }
}
