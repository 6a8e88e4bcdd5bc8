/// Generative model gateway
///
/// Wraps the four kinds of outbound calls the authoring flow makes
/// (script generation, script parsing, image generation/editing, and
/// action-prompt generation) behind one trait, with a Gemini
/// implementation and a scriptable mock for tests. Pure
/// request/response mapping: no retries, no backoff; a failed round
/// trip surfaces immediately to the caller.

mod error;
mod gateway;
pub mod prompts;
pub mod providers;

pub use error::GenerationError;
pub use gateway::{GenerativeGateway, ParsedScript, SceneDraft, ScriptDraft};
pub use providers::gemini::{GeminiConfig, GeminiGateway};
pub use providers::mock::{GatewayCall, MockGateway};
