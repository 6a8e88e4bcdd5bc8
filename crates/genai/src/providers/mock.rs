/// Scriptable in-process gateway for tests
///
/// Replies come from per-operation queues with deterministic fallbacks,
/// and every issued request is recorded so orchestration tests can
/// assert on prompts and reference sets. `delay_next_image` lets a test
/// control completion order between concurrent operations.

use crate::gateway::{GenerativeGateway, ParsedScript, SceneDraft, ScriptDraft};
use crate::GenerationError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::Duration;
use storyboard::{data_url, AspectRatio, ContentFormat, ScriptFormat};

/// One recorded gateway request, captured at call time.
#[derive(Debug, Clone)]
pub enum GatewayCall {
    Script {
        topic: String,
        scene_count: u32,
        tone: String,
    },
    Parse {
        script_format: ScriptFormat,
        with_character_descriptions: bool,
    },
    Image {
        prompt: String,
        aspect_ratio: AspectRatio,
        reference_images: Vec<String>,
    },
    Edit {
        source_image: String,
        instruction: String,
    },
    ActionPrompt {
        scene_description: String,
        scene_image: String,
    },
}

#[derive(Default)]
struct MockState {
    script_replies: VecDeque<Result<ScriptDraft, GenerationError>>,
    parse_replies: VecDeque<Result<ParsedScript, GenerationError>>,
    image_replies: VecDeque<Result<String, GenerationError>>,
    edit_replies: VecDeque<Result<String, GenerationError>>,
    action_replies: VecDeque<Result<Value, GenerationError>>,
    image_delays: VecDeque<Duration>,
    calls: Vec<GatewayCall>,
    image_counter: u32,
}

#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stock three-scene draft, handy as a queued reply.
    pub fn stock_script(title: &str) -> ScriptDraft {
        ScriptDraft {
            title: title.to_string(),
            scenes: (1..=3)
                .map(|n| SceneDraft {
                    description: format!("Visual for scene {n}"),
                    dialogue: format!("Dialogue for scene {n}"),
                    text_overlay: (n == 1).then(|| "OPENING".to_string()),
                })
                .collect(),
        }
    }

    pub fn push_script(&self, reply: Result<ScriptDraft, GenerationError>) {
        self.state.lock().script_replies.push_back(reply);
    }

    pub fn push_parse(&self, reply: Result<ParsedScript, GenerationError>) {
        self.state.lock().parse_replies.push_back(reply);
    }

    pub fn push_image(&self, reply: Result<String, GenerationError>) {
        self.state.lock().image_replies.push_back(reply);
    }

    pub fn push_edit(&self, reply: Result<String, GenerationError>) {
        self.state.lock().edit_replies.push_back(reply);
    }

    pub fn push_action(&self, reply: Result<Value, GenerationError>) {
        self.state.lock().action_replies.push_back(reply);
    }

    /// Delay the next image-generation reply; later calls are not
    /// delayed unless queued again.
    pub fn delay_next_image(&self, delay: Duration) {
        self.state.lock().image_delays.push_back(delay);
    }

    /// Snapshot of every request issued so far, in call order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.clone()
    }

    fn fresh_image(state: &mut MockState) -> String {
        state.image_counter += 1;
        data_url::encode(
            "image/png",
            format!("mock-image-{}", state.image_counter).as_bytes(),
        )
    }
}

#[async_trait]
impl GenerativeGateway for MockGateway {
    async fn generate_script(
        &self,
        topic: &str,
        _format: ContentFormat,
        scene_count: u32,
        tone: &str,
    ) -> Result<ScriptDraft, GenerationError> {
        let mut state = self.state.lock();
        state.calls.push(GatewayCall::Script {
            topic: topic.to_string(),
            scene_count,
            tone: tone.to_string(),
        });
        state
            .script_replies
            .pop_front()
            .unwrap_or_else(|| Ok(Self::stock_script(&format!("About {topic}"))))
    }

    async fn parse_script(
        &self,
        _raw_script: &str,
        script_format: ScriptFormat,
        _content_format: ContentFormat,
        character_descriptions: Option<&str>,
    ) -> Result<ParsedScript, GenerationError> {
        let mut state = self.state.lock();
        state.calls.push(GatewayCall::Parse {
            script_format,
            with_character_descriptions: character_descriptions.is_some(),
        });
        state.parse_replies.pop_front().unwrap_or_else(|| {
            let stock = Self::stock_script("Parsed Script");
            Ok(ParsedScript {
                title: stock.title,
                scenes: stock.scenes,
                characters: None,
            })
        })
    }

    async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        reference_images: &[String],
    ) -> Result<String, GenerationError> {
        let (reply, delay) = {
            let mut state = self.state.lock();
            state.calls.push(GatewayCall::Image {
                prompt: prompt.to_string(),
                aspect_ratio,
                reference_images: reference_images.to_vec(),
            });
            let reply = state
                .image_replies
                .pop_front()
                .unwrap_or_else(|| Ok(Self::fresh_image(&mut state)));
            (reply, state.image_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }

    async fn edit_image(
        &self,
        source_image: &str,
        instruction: &str,
    ) -> Result<String, GenerationError> {
        let mut state = self.state.lock();
        state.calls.push(GatewayCall::Edit {
            source_image: source_image.to_string(),
            instruction: instruction.to_string(),
        });
        state
            .edit_replies
            .pop_front()
            .unwrap_or_else(|| Ok(Self::fresh_image(&mut state)))
    }

    async fn generate_action_prompt(
        &self,
        _topic: &str,
        _format: ContentFormat,
        scene_description: &str,
        _scene_dialogue: &str,
        scene_image: &str,
    ) -> Result<Value, GenerationError> {
        let mut state = self.state.lock();
        state.calls.push(GatewayCall::ActionPrompt {
            scene_description: scene_description.to_string(),
            scene_image: scene_image.to_string(),
        });
        state.action_replies.pop_front().unwrap_or_else(|| {
            Ok(json!({
                "scene": scene_description,
                "source_image": scene_image,
                "camera": { "movement": "static" },
            }))
        })
    }
}
