use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Target delivery format; fixed once a package is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFormat {
    /// 60-second social media reel
    #[default]
    Reel,
    /// 5-10 minute YouTube video
    LongForm,
}

impl ContentFormat {
    /// Phrase used in model instructions to describe the target video.
    pub fn video_type(&self) -> &'static str {
        match self {
            Self::Reel => "60-second social media reel",
            Self::LongForm => "5-10 minute YouTube video",
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reel => write!(f, "reel"),
            Self::LongForm => write!(f, "long-form"),
        }
    }
}

/// Layout of a pasted script, selecting which extraction instructions
/// are sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptFormat {
    /// "🖼️ Visual:" / "🎙️ VO:" scene blocks
    #[default]
    SceneByScene,
    /// Hook / main point / visual prompt layout
    YoutubeShort,
    /// Free prose or story material
    UserMaterial,
}

/// Image aspect ratio applied to thumbnail and scene generation.
/// Character portraits always use 1:1 regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    Tall,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wide => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
            Self::Classic => "4:3",
            Self::Tall => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(Self::Wide),
            "9:16" => Ok(Self::Portrait),
            "1:1" => Ok(Self::Square),
            "4:3" => Ok(Self::Classic),
            "3:4" => Ok(Self::Tall),
            other => Err(format!("unknown aspect ratio '{other}'")),
        }
    }
}

/// Package thumbnail. The image may be replaced wholesale on
/// regeneration or edit; `revision` counts committed replacements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub title: String,
    /// Data URL of the generated image.
    pub image_url: String,
    #[serde(default)]
    pub revision: u64,
}

/// One narrative beat: visual description, dialogue, optional on-screen
/// text, and the generated image/action-prompt pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based, fixed at creation, matches the position in the scene list.
    pub scene_number: u32,
    pub description: String,
    pub dialogue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_overlay: Option<String>,
    /// Data URL of the generated image, set once generated.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Opaque structured prompt for a downstream video-generation tool.
    /// Recomputed whenever `image_url` changes.
    #[serde(default)]
    pub action_prompt: Option<Value>,
    /// True only while a request for this scene is in flight.
    #[serde(default)]
    pub is_loading: bool,
    /// Monotonic slot version; a write commits only against the version
    /// it was issued for.
    #[serde(default)]
    pub revision: u64,
}

impl Scene {
    pub fn new(
        scene_number: u32,
        description: String,
        dialogue: String,
        text_overlay: Option<String>,
    ) -> Self {
        Self {
            scene_number,
            description,
            dialogue,
            text_overlay,
            image_url: None,
            action_prompt: None,
            is_loading: false,
            revision: 0,
        }
    }
}

/// A declared character with an optional generated portrait. Held
/// alongside, but independent from, the package itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub revision: u64,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: None,
            is_loading: false,
            revision: 0,
        }
    }
}

/// Aggregate root for one generated video package. Created atomically
/// after initial generation and discarded on explicit clear; never
/// persisted across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelPackage {
    pub topic: String,
    pub format: ContentFormat,
    pub thumbnail: Thumbnail,
    pub scenes: Vec<Scene>,
}

impl ReelPackage {
    /// Whether every scene has a generated image.
    pub fn all_scenes_generated(&self) -> bool {
        self.scenes.iter().all(|s| s.image_url.is_some())
    }
}
