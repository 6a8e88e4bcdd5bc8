/// Request bodies for the authoring API

use serde::Deserialize;
use storyboard::{ContentFormat, ScriptFormat};
use studio::GenerationSettings;

/// POST /api/package: what to generate the package from.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum CreatePackageRequest {
    Topic {
        topic: String,
        format: ContentFormat,
    },
    Script {
        text: String,
        script_format: ScriptFormat,
        format: ContentFormat,
        #[serde(default)]
        character_descriptions: Option<String>,
    },
}

/// PUT /api/settings: replaces the session settings; the description
/// text is updated only when the field is present.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(flatten)]
    pub settings: GenerationSettings,
    #[serde(default)]
    pub character_descriptions: Option<String>,
}

/// Body for every edit endpoint.
#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub instruction: String,
}
