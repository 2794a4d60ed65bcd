//! AI generated script description and its display normalization.
//!
//! Script data comes from a language model and its shape is loose: camera
//! notes may be a string, a list, or an object, keywords may be a list or a
//! single string. Fields this client does not interpret are kept in
//! `extra` so an edited script goes back to the service intact.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback shown when no camera notes are usable.
pub const DEFAULT_CAMERA_WORK: &str = "Camera setup not specified";
/// Fallback shown when no lighting notes are usable.
pub const DEFAULT_LIGHTING: &str = "Lighting not specified";
/// Fallback shown when no style keywords are present.
pub const DEFAULT_STYLE_KEYWORDS: &str = "No style keywords specified";

/// Structured description of a generated video script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_prompts: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_veo3_prompt: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_work: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_keywords: Option<Value>,

    /// Everything else the service returned (segments, audio notes, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScriptData {
    /// Title for display, empty when missing.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Prompt the video will be generated from.
    ///
    /// The final prompt is preferred; the visual prompts are used when the
    /// final prompt is missing or empty.
    pub fn prompt_text(&self) -> String {
        [self.final_veo3_prompt.as_ref(), self.visual_prompts.as_ref()]
            .into_iter()
            .flatten()
            .find(|value| is_truthy(value))
            .map(js_string)
            .unwrap_or_default()
    }

    /// Camera notes normalized to a single display line.
    pub fn camera_work_text(&self) -> String {
        normalize_note(self.camera_work.as_ref(), DEFAULT_CAMERA_WORK)
    }

    /// Lighting notes normalized to a single display line.
    pub fn lighting_text(&self) -> String {
        normalize_note(self.lighting.as_ref(), DEFAULT_LIGHTING)
    }

    /// Style keywords joined for display.
    pub fn style_keywords_text(&self) -> String {
        let joined = match &self.style_keywords {
            Some(Value::Array(items)) => join_values(items),
            Some(value) if is_truthy(value) => js_string(value),
            _ => String::new(),
        };

        if joined.is_empty() {
            DEFAULT_STYLE_KEYWORDS.to_string()
        } else {
            joined
        }
    }

    /// Replace the visual prompts with the user's edited text.
    pub fn apply_prompt_edit(&mut self, prompt: impl Into<String>) {
        self.visual_prompts = Some(Value::String(prompt.into()));
    }
}

/// Normalize a loosely typed note (camera work, lighting) to display text.
///
/// - missing or falsy: `default`
/// - array: elements joined with ", "
/// - object: the first truthy of `text`, `value`, `description`; an empty
///   object gives `default`; otherwise string values joined with ", "
/// - the result has `{`, `}` and `"` stripped and is trimmed; empty gives
///   `default`
pub fn normalize_note(value: Option<&Value>, default: &str) -> String {
    let value = match value {
        Some(v) if is_truthy(v) => v,
        _ => return default.to_string(),
    };

    let text = match value {
        Value::Array(items) => join_values(items),
        Value::Object(map) => {
            let named = ["text", "value", "description"]
                .iter()
                .filter_map(|key| map.get(*key))
                .find(|v| is_truthy(v));

            if let Some(named) = named {
                js_string(named)
            } else if map.is_empty() {
                default.to_string()
            } else {
                let values: Vec<&str> = map
                    .values()
                    .filter_map(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .collect();
                if values.is_empty() {
                    default.to_string()
                } else {
                    values.join(", ")
                }
            }
        }
        other => js_string(other),
    };

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '"'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}

fn join_values(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Null => String::new(),
            other => js_string(other),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Loose truthiness used for model output: null, false, 0 and "" are empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn script(value: Value) -> ScriptData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_note_normalization_cases() {
        assert_eq!(normalize_note(Some(&json!({"text": "X"})), "D"), "X");
        assert_eq!(normalize_note(Some(&json!([])), "D"), "D");
        assert_eq!(normalize_note(Some(&json!({})), "D"), "D");
        assert_eq!(normalize_note(Some(&json!(["a", "b"])), "D"), "a, b");
        assert_eq!(normalize_note(None, "D"), "D");
        assert_eq!(normalize_note(Some(&json!("")), "D"), "D");
    }

    #[test]
    fn test_note_object_fallbacks() {
        assert_eq!(
            normalize_note(Some(&json!({"value": "", "description": "Wide lens"})), "D"),
            "Wide lens"
        );
        assert_eq!(
            normalize_note(Some(&json!({"fps": 24, "lens": "85mm", "movement": "dolly in"})), "D"),
            "85mm, dolly in"
        );
        assert_eq!(normalize_note(Some(&json!({"fps": 24})), "D"), "D");
    }

    #[test]
    fn test_note_strips_json_artifacts() {
        assert_eq!(
            normalize_note(Some(&json!("{\"Slow dolly in\"}  ")), "D"),
            "Slow dolly in"
        );
        assert_eq!(normalize_note(Some(&json!("{}")), "D"), "D");
    }

    #[test]
    fn test_prompt_prefers_final_prompt() {
        let data = script(json!({
            "title": "Ocean",
            "visual_prompts": "visual",
            "final_veo3_prompt": "final"
        }));
        assert_eq!(data.prompt_text(), "final");

        let data = script(json!({"visual_prompts": "visual", "final_veo3_prompt": ""}));
        assert_eq!(data.prompt_text(), "visual");

        assert_eq!(ScriptData::default().prompt_text(), "");
    }

    #[test]
    fn test_style_keywords_text() {
        let data = script(json!({"style_keywords": ["cinematic", "8K"]}));
        assert_eq!(data.style_keywords_text(), "cinematic, 8K");

        let data = script(json!({"style_keywords": "film grain"}));
        assert_eq!(data.style_keywords_text(), "film grain");

        let data = script(json!({"style_keywords": []}));
        assert_eq!(data.style_keywords_text(), DEFAULT_STYLE_KEYWORDS);
    }

    #[test]
    fn test_unknown_fields_survive_edit() {
        let mut data = script(json!({
            "title": "Ocean",
            "visual_prompts": "old",
            "segments": [{"prompt": "a"}],
            "audio": "waves"
        }));

        data.apply_prompt_edit("new prompt");
        let value = serde_json::to_value(&data).unwrap();

        assert_eq!(value["visual_prompts"], "new prompt");
        assert_eq!(value["segments"][0]["prompt"], "a");
        assert_eq!(value["audio"], "waves");
        assert_eq!(value["title"], "Ocean");
    }
}
