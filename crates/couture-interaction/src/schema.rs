//! Structured-output schema for suggestion responses.

use serde_json::{Value, json};
use strum::IntoEnumIterator;

use couture_core::outfit::{OutfitKind, VARIATIONS_PER_CATEGORY};

/// JSON schema the backend must follow when answering a suggestion request:
/// an array of `{ type, outfits: [{ description, items[] }] }`.
pub fn outfit_response_schema() -> Value {
    let kinds: Vec<String> = OutfitKind::iter().map(|kind| kind.to_string()).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "type": {
                    "type": "STRING",
                    "enum": kinds,
                    "description": "The type of the outfit suggestion category."
                },
                "outfits": {
                    "type": "ARRAY",
                    "description": format!(
                        "A list of {VARIATIONS_PER_CATEGORY} distinct outfit variations for this category."
                    ),
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "description": {
                                "type": "STRING",
                                "description": "A detailed description of this specific outfit variation."
                            },
                            "items": {
                                "type": "ARRAY",
                                "description": "Clothing item names for this outfit, e.g. \"White Cotton T-Shirt\".",
                                "items": { "type": "STRING" }
                            }
                        },
                        "required": ["description", "items"]
                    }
                }
            },
            "required": ["type", "outfits"]
        }
    })
}
