//! Review step between script generation and rendering.

use driftly_models::ScriptData;

/// Editable view of a generated script.
///
/// The display fields are normalized once on construction. Only the prompt
/// can be edited; [`PromptPreview::commit`] writes it back into the
/// script's `visual_prompts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPreview {
    script: ScriptData,
    title: String,
    prompt: String,
    camera_work: String,
    lighting: String,
    style_keywords: String,
}

impl PromptPreview {
    pub fn new(script: ScriptData) -> Self {
        Self {
            title: script.title().to_string(),
            prompt: script.prompt_text(),
            camera_work: script.camera_work_text(),
            lighting: script.lighting_text(),
            style_keywords: script.style_keywords_text(),
            script,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn camera_work(&self) -> &str {
        &self.camera_work
    }

    pub fn lighting(&self) -> &str {
        &self.lighting
    }

    pub fn style_keywords(&self) -> &str {
        &self.style_keywords
    }

    /// Script as received from the service.
    pub fn script(&self) -> &ScriptData {
        &self.script
    }

    /// Replace the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Script to send back, with the current prompt as `visual_prompts`.
    pub fn commit(&self) -> ScriptData {
        let mut script = self.script.clone();
        script.apply_prompt_edit(self.prompt.clone());
        script
    }
}
