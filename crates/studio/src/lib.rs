/// Package assembly and per-item orchestration
///
/// A single state-owning controller accepts authoring commands, issues
/// the matching gateway calls, and commits results back into the
/// in-memory session. Concurrent operations on the same image slot are
/// resolved by per-slot revision counters: a write commits only if it
/// was issued against the slot's current revision, otherwise it is
/// discarded and logged.

mod assembler;
mod controller;
mod error;
mod reference;
mod settings;

pub use assembler::assemble_package;
pub use controller::{EditOutcome, EditTarget, StudioController, StudioSession};
pub use error::StudioError;
pub use reference::{reference_images, SceneScope};
pub use settings::{GenerationSettings, PackageSource};
