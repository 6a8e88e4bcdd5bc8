use exporters::ExportError;
use genai::GenerationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    /// Rejected before any remote call; no state was mutated.
    #[error("{0}")]
    Validation(String),
    #[error("No package has been generated yet")]
    NoPackage,
    #[error("Scene {0} does not exist")]
    SceneIndex(usize),
    #[error("Character {0} does not exist")]
    CharacterIndex(usize),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
