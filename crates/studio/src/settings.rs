use serde::{Deserialize, Serialize};
use storyboard::{AspectRatio, ScriptFormat};

/// Session-level generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Applied to thumbnail and scene images; portraits stay 1:1.
    pub aspect_ratio: AspectRatio,
    /// Scene count requested from the model; topic-based generation only.
    pub scene_count: u32,
    /// Free text; empty leaves the tone to the model.
    pub tone: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            scene_count: 7,
            tone: String::new(),
        }
    }
}

impl GenerationSettings {
    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_scene_count(mut self, scene_count: u32) -> Self {
        self.scene_count = scene_count;
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }
}

/// What the initial package is generated from.
#[derive(Debug, Clone)]
pub enum PackageSource {
    /// Generate a fresh script from a topic.
    Topic(String),
    /// Parse a pasted script, optionally with character descriptions.
    Script {
        text: String,
        format: ScriptFormat,
        character_descriptions: Option<String>,
    },
}
