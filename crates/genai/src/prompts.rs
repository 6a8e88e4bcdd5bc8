/// Instruction text for every gateway operation
///
/// All model-facing wording lives here so providers stay pure
/// request/response plumbing and the texts can be tested without a
/// network.

use storyboard::{AspectRatio, ContentFormat, ScriptFormat};

/// Instruction for drafting a script from a topic.
pub fn script_prompt(topic: &str, format: ContentFormat, scene_count: u32, tone: &str) -> String {
    let tone_instruction = if tone.trim().is_empty() {
        "The script should have a tone that is appropriate for the topic.".to_string()
    } else {
        format!("The script should have a {} tone.", tone.trim())
    };
    format!(
        "Generate a script for a {video_type} on '{topic}'. Create exactly {scene_count} scenes. \
{tone_instruction} For each scene, provide a visual description and spoken dialogue. When a \
scene's message can be enhanced by a text overlay, add a 'textOverlay' field with short, \
impactful text (max 10 words). If no text is needed, omit the 'textOverlay' field. Output MUST \
be valid JSON: {{ \"title\": \"Catchy Title\", \"scenes\": [{{\"description\": \"Visual \
description\", \"dialogue\": \"Spoken text\", \"textOverlay\": \"Optional text overlay\"}}, \
...] }}",
        video_type = format.video_type(),
    )
}

/// Instruction for converting a pasted script into the structured form.
pub fn parse_prompt(
    raw_script: &str,
    script_format: ScriptFormat,
    content_format: ContentFormat,
    character_descriptions: Option<&str>,
) -> String {
    let video_type = content_format.video_type();
    let format_instructions = match script_format {
        ScriptFormat::SceneByScene => {
            "The script is in a scene-by-scene format. \"🎙️ VO:\" indicates dialogue/voice-over, \
and \"🖼️ Visual:\" indicates the visual description for each scene. Extract these into the JSON \
structure, creating one scene object for each scene in the script."
                .to_string()
        }
        ScriptFormat::YoutubeShort => format!(
            "The script is for a YouTube short. Extract the \"Hook\", \"Main Point\", and \
\"Visual Prompt\" to create a sequence of scenes. The dialogue should be derived from the main \
points. The \"title\" should be catchy and based on the hook. Generate a suitable number of \
scenes to represent the script for a {video_type}."
        ),
        ScriptFormat::UserMaterial => format!(
            "This is a piece of prose/story. Break it down into a suitable number of scenes for \
a {video_type}. The number of scenes should be determined by the content of the story, creating \
as many scenes as needed to represent the material effectively. For each scene, create a \
concise visual description and extract or summarize relevant text as dialogue. The \"title\" \
should be a catchy title based on the overall theme of the provided text."
        ),
    };

    let character_instructions = match character_descriptions.map(str::trim) {
        Some(descriptions) if !descriptions.is_empty() => format!(
            "\nThe user has provided detailed character descriptions below. Use these \
descriptions to create rich and consistent visual descriptions for each scene. Ensure the \
appearance, attire, and mannerisms of the characters in the scenes align perfectly with their \
provided descriptions.\n\nCHARACTER DESCRIPTIONS:\n---\n{descriptions}\n---\n"
        ),
        _ => String::new(),
    };

    format!(
        "Analyze the following script and convert it into a structured JSON format for a \
{video_type}.\n{format_instructions}\n{character_instructions}\
Also, scan the script for character declarations in the format 'Character: [Full Name]'. If \
found, extract the names and return them in a 'characters' array in the root of the JSON \
object. If no characters are declared this way, omit the 'characters' field.\n\
For each scene you create, also consider if a text overlay would enhance the message. If so, \
add a 'textOverlay' field with short, impactful text (max 10 words). If no text is needed, omit \
this field.\n\
The final output MUST be valid JSON with this exact structure: {{ \"title\": \"Catchy Title\", \
\"scenes\": [{{\"description\": \"Visual description\", \"dialogue\": \"Spoken text or \
voice-over\", \"textOverlay\": \"Optional text overlay\"}}, ...], \"characters\": [\"Character \
Name 1\", \"Character Name 2\"] }}.\n\nHere is the script:\n---\n{raw_script}\n---"
    )
}

/// Instruction prefix asking the model to keep new images consistent
/// with the supplied reference images.
pub const CONSISTENCY_INSTRUCTION: &str = "Generate a new image based on the text prompt, but \
maintain character and style consistency based on the following reference image(s).";

/// Wrap an image prompt with the cinematic/aspect framing.
pub fn image_prompt(prompt: &str, aspect_ratio: AspectRatio) -> String {
    format!("Generate a cinematic image with a {aspect_ratio} aspect ratio. {prompt}")
}

/// Instruction for applying an edit to an existing image.
pub fn edit_prompt(instruction: &str) -> String {
    format!(
        "Edit the provided image based on the following instruction: \"{instruction}\". \
Maintain the original style and composition as much as possible, only applying the requested \
change."
    )
}

/// Prompt for the thumbnail image. Biased toward the first scene's
/// subject and setting when one exists; otherwise generic topic-based.
pub fn thumbnail_prompt(title: &str, topic: &str, first_scene: Option<&str>) -> String {
    match first_scene {
        Some(scene) => format!(
            "A visually stunning and click-worthy thumbnail for a video titled \"{title}\" on \
the topic of \"{topic}\". Depict the subject and setting of this opening scene: {scene}. High \
resolution, cinematic quality."
        ),
        None => format!(
            "A visually stunning and click-worthy thumbnail for a video titled \"{title}\" on \
the topic of \"{topic}\". High resolution, cinematic quality."
        ),
    }
}

/// Portrait prompt for a character. Prefers the full description block
/// when the user supplied one.
pub fn character_prompt(name: &str, description_block: Option<&str>) -> String {
    match description_block {
        Some(block) => format!(
            "A detailed character portrait matching this description exactly:\n{block}\nHigh \
resolution, cinematic quality, neutral studio background."
        ),
        None => format!(
            "A detailed character portrait of \"{name}\". High resolution, cinematic quality, \
neutral studio background."
        ),
    }
}

/// Instruction for the structured action prompt generated from a
/// scene's final image.
pub fn action_prompt(
    topic: &str,
    format: ContentFormat,
    scene_description: &str,
    scene_dialogue: &str,
) -> String {
    let video_type = match format {
        ContentFormat::Reel => "60-second reel",
        ContentFormat::LongForm => "5-10 minute YouTube video",
    };
    format!(
        "As a VEO 3 prompt engineer, create a detailed JSON action prompt for a single scene of \
a {video_type} video. The video's topic is \"{topic}\". This scene's visual description is: \
\"{scene_description}\". The dialogue for this scene is: \"{scene_dialogue}\". Create a JSON \
object that captures these details with visual and audio cues, suitable for a video generation \
model. Output ONLY the valid JSON object for this single scene."
    )
}
