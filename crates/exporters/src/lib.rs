/// Export packager
///
/// Serializes an assembled package into a downloadable zip archive:
/// the thumbnail at the root, scene images and their action-prompt
/// JSON under `scenes/`, character portraits under `characters/`, and
/// a plain-text transcript as `script.txt`. Individual images that
/// fail to decode are skipped rather than aborting the archive.

use std::io::{Cursor, Write};
use storyboard::{data_url, slugify, Character, ReelPackage, Scene};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Archive name derived from a filesystem-safe slug of the topic.
pub fn archive_file_name(topic: &str) -> String {
    format!("reel-package-{}.zip", slugify(topic))
}

/// Build the archive in memory and return its bytes.
pub fn build_archive(
    package: &ReelPackage,
    characters: &[Character],
) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    write_image(&mut writer, "thumbnail", &package.thumbnail.image_url, options)?;

    for scene in &package.scenes {
        if let Some(image_url) = &scene.image_url {
            let base = format!("scenes/scene_{}", scene.scene_number);
            write_image(&mut writer, &base, image_url, options)?;
        }
        if let Some(prompt) = &scene.action_prompt {
            let name = format!("scenes/scene_{}_prompt.json", scene.scene_number);
            writer.start_file(name, options)?;
            writer.write_all(serde_json::to_string_pretty(prompt)?.as_bytes())?;
        }
    }

    for character in characters {
        if let Some(image_url) = &character.image_url {
            let base = format!("characters/{}", slugify(&character.name));
            write_image(&mut writer, &base, image_url, options)?;
        }
    }

    writer.start_file("script.txt", options)?;
    writer.write_all(transcript(package).as_bytes())?;

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

/// Plain-text transcript: title, then per scene its visual description,
/// dialogue, and optional text overlay.
pub fn transcript(package: &ReelPackage) -> String {
    let mut text = format!("Title: {}\n\n---\n\n", package.thumbnail.title);
    for scene in &package.scenes {
        text.push_str(&scene_entry(scene));
    }
    text
}

fn scene_entry(scene: &Scene) -> String {
    let mut entry = format!("Scene {}\n", scene.scene_number);
    entry.push_str(&format!("Visual: {}\n", scene.description));
    entry.push_str(&format!("Dialogue: \"{}\"\n", scene.dialogue));
    if let Some(overlay) = &scene.text_overlay {
        entry.push_str(&format!("Text Overlay: \"{overlay}\"\n"));
    }
    entry.push_str("\n---\n\n");
    entry
}

/// Decode and write one image entry. Undecodable data URLs are skipped
/// so one bad image never discards an otherwise-valid archive.
fn write_image(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name_base: &str,
    image_url: &str,
    options: FileOptions,
) -> Result<(), ExportError> {
    let Some(decoded) = data_url::decode(image_url) else {
        tracing::debug!(entry = name_base, "skipping undecodable image");
        return Ok(());
    };
    let extension = decoded.extension().unwrap_or("png");
    writer.start_file(format!("{name_base}.{extension}"), options)?;
    writer.write_all(&decoded.bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storyboard::{ContentFormat, Thumbnail};

    fn sample_package() -> ReelPackage {
        let mut scenes: Vec<Scene> = (1..=3)
            .map(|n| {
                Scene::new(
                    n,
                    format!("Visual {n}"),
                    format!("Line {n}"),
                    (n == 2).then(|| "BOOM".to_string()),
                )
            })
            .collect();
        scenes[0].image_url = Some(data_url::encode("image/png", b"scene-1"));
        scenes[0].action_prompt = Some(json!({"camera": "static"}));
        scenes[1].image_url = Some(data_url::encode("image/jpeg", b"scene-2"));
        // scene 3 has no image and no prompt

        ReelPackage {
            topic: "Solar Power".into(),
            format: ContentFormat::Reel,
            thumbnail: Thumbnail {
                title: "Powering Tomorrow".into(),
                image_url: data_url::encode("image/png", b"thumb"),
                revision: 0,
            },
            scenes,
        }
    }

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_archive_entry_census() {
        let package = sample_package();
        let characters = vec![{
            let mut c = Character::new("Ada Vale");
            c.image_url = Some(data_url::encode("image/png", b"ada"));
            c
        }];

        let names = entry_names(build_archive(&package, &characters).unwrap());
        assert!(names.contains(&"thumbnail.png".to_string()));
        assert!(names.contains(&"scenes/scene_1.png".to_string()));
        assert!(names.contains(&"scenes/scene_1_prompt.json".to_string()));
        assert!(names.contains(&"scenes/scene_2.jpg".to_string()));
        assert!(names.contains(&"characters/ada_vale.png".to_string()));
        assert!(names.contains(&"script.txt".to_string()));
        // scene 3 never generated an image or prompt
        assert!(!names.iter().any(|n| n.contains("scene_3")));
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_bad_image_is_skipped_not_fatal() {
        let mut package = sample_package();
        package.scenes[1].image_url = Some("nonsense".into());
        package.thumbnail.image_url = "data:image/png;base64".into();

        let names = entry_names(build_archive(&package, &[]).unwrap());
        assert!(!names.iter().any(|n| n.starts_with("thumbnail")));
        assert!(!names.iter().any(|n| n.contains("scene_2.")));
        assert!(names.contains(&"scenes/scene_1.png".to_string()));
        assert!(names.contains(&"script.txt".to_string()));
    }

    #[test]
    fn test_transcript_format() {
        let text = transcript(&sample_package());
        assert!(text.starts_with("Title: Powering Tomorrow\n\n---\n\n"));
        assert!(text.contains("Scene 1\nVisual: Visual 1\nDialogue: \"Line 1\"\n"));
        assert!(text.contains("Text Overlay: \"BOOM\"\n"));
        // only scene 2 carries an overlay
        assert_eq!(text.matches("Text Overlay:").count(), 1);
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(
            archive_file_name("Solar Power!"),
            "reel-package-solar_power_.zip"
        );
    }
}
