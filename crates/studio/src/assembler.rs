use crate::{GenerationSettings, PackageSource, StudioError};
use genai::{prompts, GenerativeGateway, SceneDraft};
use storyboard::{Character, ContentFormat, ReelPackage, Scene, Thumbnail};

/// Run the initial generation: obtain script data, derive and render
/// the thumbnail, and build the package. Fails as a whole; a partial
/// package is never returned.
pub async fn assemble_package(
    gateway: &dyn GenerativeGateway,
    source: &PackageSource,
    format: ContentFormat,
    settings: &GenerationSettings,
) -> Result<(ReelPackage, Vec<Character>), StudioError> {
    let (topic, title, drafts, characters) = match source {
        PackageSource::Topic(topic) => {
            let draft = gateway
                .generate_script(topic, format, settings.scene_count, &settings.tone)
                .await?;
            (topic.clone(), draft.title, draft.scenes, Vec::new())
        }
        PackageSource::Script {
            text,
            format: script_format,
            character_descriptions,
        } => {
            let parsed = gateway
                .parse_script(
                    text,
                    *script_format,
                    format,
                    character_descriptions.as_deref(),
                )
                .await?;
            let characters = parsed
                .characters
                .unwrap_or_default()
                .into_iter()
                .map(Character::new)
                .collect();
            // the parsed title doubles as the working topic
            (parsed.title.clone(), parsed.title, parsed.scenes, characters)
        }
    };

    let first_scene = drafts.first().map(|s| s.description.as_str());
    let thumbnail_prompt = prompts::thumbnail_prompt(&title, &topic, first_scene);
    let image_url = gateway
        .generate_image(&thumbnail_prompt, settings.aspect_ratio, &[])
        .await?;

    let package = ReelPackage {
        topic,
        format,
        thumbnail: Thumbnail {
            title,
            image_url,
            revision: 0,
        },
        scenes: drafts.into_iter().enumerate().map(build_scene).collect(),
    };
    Ok((package, characters))
}

fn build_scene((index, draft): (usize, SceneDraft)) -> Scene {
    Scene::new(
        index as u32 + 1,
        draft.description,
        draft.dialogue,
        draft.text_overlay,
    )
}
