use crate::GenerationError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use storyboard::{AspectRatio, ContentFormat, ScriptFormat};

/// One scene as the model drafts it, before package assembly.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDraft {
    pub description: String,
    pub dialogue: String,
    #[serde(default, rename = "textOverlay")]
    pub text_overlay: Option<String>,
}

/// Structured reply to a script-generation call.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptDraft {
    pub title: String,
    pub scenes: Vec<SceneDraft>,
}

/// Structured reply to a script-parsing call. `characters` is present
/// only when the source text declares characters in the recognized
/// `Character: [Full Name]` pattern.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedScript {
    pub title: String,
    pub scenes: Vec<SceneDraft>,
    #[serde(default)]
    pub characters: Option<Vec<String>>,
}

/// The five operations the authoring flow issues against the remote
/// model. Each is a single request/response round trip; inputs are
/// caller-validated and nothing is retried internally.
#[async_trait]
pub trait GenerativeGateway: Send + Sync {
    /// Draft a script for `topic`. An empty `tone` leaves the tone to
    /// the model.
    async fn generate_script(
        &self,
        topic: &str,
        format: ContentFormat,
        scene_count: u32,
        tone: &str,
    ) -> Result<ScriptDraft, GenerationError>;

    /// Convert a pasted script into the structured form, extracting
    /// declared characters when present.
    async fn parse_script(
        &self,
        raw_script: &str,
        script_format: ScriptFormat,
        content_format: ContentFormat,
        character_descriptions: Option<&str>,
    ) -> Result<ParsedScript, GenerationError>;

    /// Generate an image, optionally conditioned on reference images
    /// (data URLs) for character/style consistency. Returns a data URL.
    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        reference_images: &[String],
    ) -> Result<String, GenerationError>;

    /// Apply an edit instruction to a single image. Returns a data URL.
    async fn edit_image(
        &self,
        source_image: &str,
        instruction: &str,
    ) -> Result<String, GenerationError>;

    /// Produce the opaque structured action prompt for a rendered
    /// scene. The value is consumed verbatim, never interpreted.
    async fn generate_action_prompt(
        &self,
        topic: &str,
        format: ContentFormat,
        scene_description: &str,
        scene_dialogue: &str,
        scene_image: &str,
    ) -> Result<Value, GenerationError>;
}
