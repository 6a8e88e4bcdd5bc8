/// Google Gemini provider
///
/// Talks to the `generateContent` REST endpoint. Structured replies are
/// requested with `responseMimeType: application/json`; image replies
/// with `responseModalities: ["IMAGE"]` and extracted from the first
/// `inlineData` part. Reference images travel as inline base64 parts.

use crate::gateway::{GenerativeGateway, ParsedScript, ScriptDraft};
use crate::{prompts, GenerationError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use storyboard::{data_url, AspectRatio, ContentFormat, ScriptFormat};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Model for script, parse, and action-prompt calls.
    pub text_model: String,
    /// Model for image generation and editing.
    pub image_model: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

pub struct GeminiGateway {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::configuration("Gemini API key is required"));
        }
        if config.text_model.trim().is_empty() || config.image_model.trim().is_empty() {
            return Err(GenerationError::configuration("Gemini model name is required"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::configuration(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model.trim()
        )
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<Value>,
        generation_config: Value,
    ) -> Result<GeminiResponse, GenerationError> {
        let payload = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": generation_config,
        });
        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenerationError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerationError::transport(format!("HTTP {status}: {body}")));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            GenerationError::invalid_response(format!("invalid Gemini response JSON: {e}"))
        })?;
        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                model,
                latency_ms = start.elapsed().as_millis() as u64,
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini call completed"
            );
        }
        Ok(parsed)
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        parts: Vec<Value>,
    ) -> Result<T, GenerationError> {
        let response = self
            .generate_content(
                &self.config.text_model,
                parts,
                json!({ "responseMimeType": "application/json" }),
            )
            .await?;
        let text = extract_text(&response)?;
        serde_json::from_str(text.trim())
            .map_err(|e| GenerationError::invalid_response(format!("{e}; reply: {text}")))
    }
}

#[async_trait]
impl GenerativeGateway for GeminiGateway {
    async fn generate_script(
        &self,
        topic: &str,
        format: ContentFormat,
        scene_count: u32,
        tone: &str,
    ) -> Result<ScriptDraft, GenerationError> {
        let prompt = prompts::script_prompt(topic, format, scene_count, tone);
        self.generate_json(vec![text_part(&prompt)]).await
    }

    async fn parse_script(
        &self,
        raw_script: &str,
        script_format: ScriptFormat,
        content_format: ContentFormat,
        character_descriptions: Option<&str>,
    ) -> Result<ParsedScript, GenerationError> {
        let prompt =
            prompts::parse_prompt(raw_script, script_format, content_format, character_descriptions);
        self.generate_json(vec![text_part(&prompt)]).await
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        reference_images: &[String],
    ) -> Result<String, GenerationError> {
        let mut parts = Vec::with_capacity(reference_images.len() + 2);
        for reference in reference_images {
            parts.push(inline_image_part(reference)?);
        }
        if !reference_images.is_empty() {
            parts.push(text_part(prompts::CONSISTENCY_INSTRUCTION));
        }
        parts.push(text_part(&prompts::image_prompt(prompt, aspect_ratio)));

        let response = self
            .generate_content(
                &self.config.image_model,
                parts,
                json!({ "responseModalities": ["IMAGE"] }),
            )
            .await?;
        extract_image(&response, "image generation")
    }

    async fn edit_image(
        &self,
        source_image: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let parts = vec![
            inline_image_part(source_image)?,
            text_part(&prompts::edit_prompt(instruction)),
        ];
        let response = self
            .generate_content(
                &self.config.image_model,
                parts,
                json!({ "responseModalities": ["IMAGE"] }),
            )
            .await?;
        extract_image(&response, "image edit")
    }

    async fn generate_action_prompt(
        &self,
        topic: &str,
        format: ContentFormat,
        scene_description: &str,
        scene_dialogue: &str,
        scene_image: &str,
    ) -> Result<Value, GenerationError> {
        let parts = vec![
            inline_image_part(scene_image)?,
            text_part(&prompts::action_prompt(
                topic,
                format,
                scene_description,
                scene_dialogue,
            )),
        ];
        self.generate_json(parts).await
    }
}

fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

/// Inline a data URL as an `inlineData` part without re-encoding.
fn inline_image_part(image_data_url: &str) -> Result<Value, GenerationError> {
    let (mime, payload) = data_url::split(image_data_url).ok_or_else(|| {
        GenerationError::configuration("image is not a base64 data URL")
    })?;
    Ok(json!({ "inlineData": { "mimeType": mime, "data": payload } }))
}

/// Concatenated text of the first candidate's parts.
fn extract_text(response: &GeminiResponse) -> Result<String, GenerationError> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| GenerationError::invalid_response("Gemini response had no candidates"))?;
    let text: String = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.as_ref())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.is_empty() {
        return Err(GenerationError::invalid_response(
            "Gemini response contained no text parts",
        ));
    }
    Ok(text)
}

/// First inline image of the first candidate, as a data URL.
fn extract_image(response: &GeminiResponse, context: &str) -> Result<String, GenerationError> {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.as_ref())
        .and_then(|parts| parts.iter().find_map(|p| p.inline_data.as_ref()))
        .map(|inline| {
            let mime = inline.mime_type.as_deref().unwrap_or("image/png");
            format!("data:{mime};base64,{}", inline.data)
        })
        .ok_or_else(|| GenerationError::NoImage(context.to_string()))
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "inlineData")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    #[serde(default, rename = "mimeType")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiUsage {
    #[serde(default, rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(default, rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
    #[serde(default, rename = "totalTokenCount")]
    total_token_count: Option<u32>,
}
