use thiserror::Error;

/// Failure modes a gateway call can surface. Transport-level and
/// service-level failures are not distinguished beyond this; the
/// caller owns any retry affordance.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Gateway misconfigured: {0}")]
    Configuration(String),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Model returned an unparseable reply: {0}")]
    InvalidResponse(String),
    #[error("Model returned no image for {0}")]
    NoImage(String),
}

impl GenerationError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
