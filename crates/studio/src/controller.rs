use crate::reference::{reference_images, SceneScope};
use crate::{assemble_package, GenerationSettings, PackageSource, StudioError};
use genai::{prompts, GenerationError, GenerativeGateway};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use storyboard::characters::{find_block, parse_blocks};
use storyboard::{AspectRatio, Character, ContentFormat, ReelPackage};

/// Which image slot an edit instruction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Thumbnail,
    Scene(usize),
    Character(usize),
}

/// Whether an edit actually issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// Empty/whitespace instruction; nothing was sent or changed.
    Skipped,
}

/// Everything a session holds. In-memory only; discarded on clear.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StudioSession {
    pub package: Option<ReelPackage>,
    pub characters: Vec<Character>,
    /// Raw character-description text, matched by `Name:` blocks when
    /// generating portraits.
    pub character_descriptions: String,
    pub settings: GenerationSettings,
}

/// Single state-owning controller. Commands run as independent async
/// operations; each one snapshots what it needs up front, awaits the
/// gateway without holding the lock, and commits against the slot
/// revision it was issued for. Stale results are discarded and logged.
pub struct StudioController {
    gateway: Arc<dyn GenerativeGateway>,
    state: RwLock<StudioSession>,
}

struct SceneJob {
    topic: String,
    format: ContentFormat,
    description: String,
    dialogue: String,
    aspect_ratio: AspectRatio,
    references: Vec<String>,
    revision: u64,
}

impl StudioController {
    pub fn new(gateway: Arc<dyn GenerativeGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(StudioSession::default()),
        }
    }

    pub fn with_settings(self, settings: GenerationSettings) -> Self {
        self.state.write().settings = settings;
        self
    }

    pub fn snapshot(&self) -> StudioSession {
        self.state.read().clone()
    }

    pub fn update_settings(&self, settings: GenerationSettings) {
        self.state.write().settings = settings;
    }

    pub fn set_character_descriptions(&self, text: impl Into<String>) {
        self.state.write().character_descriptions = text.into();
    }

    /// Discard the package, characters, and description text.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.package = None;
        state.characters.clear();
        state.character_descriptions.clear();
    }

    /// Initial generation. Validates input before any remote call and
    /// commits the new package atomically; a failure along the way
    /// leaves existing state untouched.
    pub async fn create_package(
        &self,
        source: PackageSource,
        format: ContentFormat,
    ) -> Result<(), StudioError> {
        match &source {
            PackageSource::Topic(topic) if topic.trim().is_empty() => {
                return Err(StudioError::Validation(
                    "Please enter a content topic.".into(),
                ));
            }
            PackageSource::Script { text, .. } if text.trim().is_empty() => {
                return Err(StudioError::Validation("Please paste your script.".into()));
            }
            _ => {}
        }

        let settings = self.state.read().settings.clone();
        let (package, characters) =
            assemble_package(self.gateway.as_ref(), &source, format, &settings).await?;

        let mut state = self.state.write();
        state.character_descriptions = match &source {
            PackageSource::Script {
                character_descriptions: Some(descriptions),
                ..
            } => descriptions.clone(),
            _ => String::new(),
        };
        state.package = Some(package);
        state.characters = characters;
        Ok(())
    }

    /// First generation for a scene: earlier scenes only as context.
    pub async fn generate_scene_image(&self, index: usize) -> Result<(), StudioError> {
        self.scene_image_op(index, SceneScope::Before(index)).await
    }

    /// Regeneration: any other scene may serve as context.
    pub async fn regenerate_scene_image(&self, index: usize) -> Result<(), StudioError> {
        self.scene_image_op(index, SceneScope::Excluding(index)).await
    }

    async fn scene_image_op(&self, index: usize, scope: SceneScope) -> Result<(), StudioError> {
        let job = self.begin_scene_job(index, scope)?;

        let image = match self
            .gateway
            .generate_image(&job.description, job.aspect_ratio, &job.references)
            .await
        {
            Ok(image) => image,
            Err(e) => {
                self.clear_scene_loading(index);
                return Err(e.into());
            }
        };

        let (action_prompt, action_err) = self.scene_action_prompt(&job, &image).await;
        // image committed even when the action-prompt step failed; the
        // prompt stays unset and the error still reaches the caller
        self.commit_scene(index, job.revision, image, action_prompt);
        match action_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Rebuild the thumbnail from the same first-scene-biased prompt,
    /// with the full reference set as context. Replaces only the image.
    pub async fn regenerate_thumbnail(&self) -> Result<(), StudioError> {
        let (prompt, references, aspect_ratio, revision) = {
            let state = self.state.read();
            let package = state.package.as_ref().ok_or(StudioError::NoPackage)?;
            let first_scene = package.scenes.first().map(|s| s.description.as_str());
            (
                prompts::thumbnail_prompt(&package.thumbnail.title, &package.topic, first_scene),
                reference_images(package, &state.characters, SceneScope::All),
                state.settings.aspect_ratio,
                package.thumbnail.revision,
            )
        };

        let image = self
            .gateway
            .generate_image(&prompt, aspect_ratio, &references)
            .await?;

        let mut state = self.state.write();
        if let Some(package) = state.package.as_mut() {
            if package.thumbnail.revision != revision {
                tracing::warn!("discarding stale thumbnail write");
            } else {
                package.thumbnail.image_url = image;
                package.thumbnail.revision += 1;
            }
        }
        Ok(())
    }

    /// Generate a 1:1 portrait. The prompt uses the character's `Name:`
    /// block from the description text when one matches, otherwise a
    /// generic prompt from the name alone.
    pub async fn generate_character_image(&self, index: usize) -> Result<(), StudioError> {
        let (prompt, revision) = {
            let mut state = self.state.write();
            let name = state
                .characters
                .get(index)
                .ok_or(StudioError::CharacterIndex(index))?
                .name
                .clone();
            let blocks = parse_blocks(&state.character_descriptions);
            let block = find_block(&blocks, &name).map(|b| b.body.clone());
            let character = &mut state.characters[index];
            character.is_loading = true;
            (
                prompts::character_prompt(&name, block.as_deref()),
                character.revision,
            )
        };

        match self
            .gateway
            .generate_image(&prompt, AspectRatio::Square, &[])
            .await
        {
            Ok(image) => {
                self.commit_character(index, revision, image);
                Ok(())
            }
            Err(e) => {
                self.clear_character_loading(index);
                Err(e.into())
            }
        }
    }

    /// Apply an edit instruction to the target's current image. An
    /// empty instruction is a no-op; scene edits also refresh the
    /// action prompt from the edited image.
    pub async fn edit_image(
        &self,
        target: EditTarget,
        instruction: &str,
    ) -> Result<EditOutcome, StudioError> {
        if instruction.trim().is_empty() {
            return Ok(EditOutcome::Skipped);
        }
        match target {
            EditTarget::Thumbnail => self.edit_thumbnail(instruction).await,
            EditTarget::Scene(index) => self.edit_scene(index, instruction).await,
            EditTarget::Character(index) => self.edit_character(index, instruction).await,
        }
    }

    async fn edit_thumbnail(&self, instruction: &str) -> Result<EditOutcome, StudioError> {
        let (source, revision) = {
            let state = self.state.read();
            let package = state.package.as_ref().ok_or(StudioError::NoPackage)?;
            (
                package.thumbnail.image_url.clone(),
                package.thumbnail.revision,
            )
        };

        let image = self.gateway.edit_image(&source, instruction).await?;

        let mut state = self.state.write();
        if let Some(package) = state.package.as_mut() {
            if package.thumbnail.revision != revision {
                tracing::warn!("discarding stale thumbnail edit");
            } else {
                package.thumbnail.image_url = image;
                package.thumbnail.revision += 1;
            }
        }
        Ok(EditOutcome::Applied)
    }

    async fn edit_scene(&self, index: usize, instruction: &str) -> Result<EditOutcome, StudioError> {
        let (job, source) = {
            let mut state = self.state.write();
            let session = &mut *state;
            let package = session.package.as_mut().ok_or(StudioError::NoPackage)?;
            let scene = package
                .scenes
                .get_mut(index)
                .ok_or(StudioError::SceneIndex(index))?;
            let source = scene.image_url.clone().ok_or_else(|| {
                StudioError::Validation(format!(
                    "Scene {} has no image to edit yet.",
                    scene.scene_number
                ))
            })?;
            scene.is_loading = true;
            let job = SceneJob {
                topic: package.topic.clone(),
                format: package.format,
                description: package.scenes[index].description.clone(),
                dialogue: package.scenes[index].dialogue.clone(),
                aspect_ratio: session.settings.aspect_ratio,
                references: Vec::new(),
                revision: package.scenes[index].revision,
            };
            (job, source)
        };

        let image = match self.gateway.edit_image(&source, instruction).await {
            Ok(image) => image,
            Err(e) => {
                self.clear_scene_loading(index);
                return Err(e.into());
            }
        };

        let (action_prompt, action_err) = self.scene_action_prompt(&job, &image).await;
        self.commit_scene(index, job.revision, image, action_prompt);
        match action_err {
            Some(e) => Err(e.into()),
            None => Ok(EditOutcome::Applied),
        }
    }

    async fn edit_character(
        &self,
        index: usize,
        instruction: &str,
    ) -> Result<EditOutcome, StudioError> {
        let (source, revision) = {
            let mut state = self.state.write();
            let character = state
                .characters
                .get_mut(index)
                .ok_or(StudioError::CharacterIndex(index))?;
            let source = character.image_url.clone().ok_or_else(|| {
                StudioError::Validation(format!(
                    "Character \"{}\" has no portrait to edit yet.",
                    character.name
                ))
            })?;
            character.is_loading = true;
            (source, character.revision)
        };

        match self.gateway.edit_image(&source, instruction).await {
            Ok(image) => {
                self.commit_character(index, revision, image);
                Ok(EditOutcome::Applied)
            }
            Err(e) => {
                self.clear_character_loading(index);
                Err(e.into())
            }
        }
    }

    /// Zip the current package for download; returns (file name, bytes).
    pub fn export(&self) -> Result<(String, Vec<u8>), StudioError> {
        let (package, characters) = {
            let state = self.state.read();
            let package = state.package.clone().ok_or(StudioError::NoPackage)?;
            (package, state.characters.clone())
        };
        let bytes = exporters::build_archive(&package, &characters)?;
        Ok((exporters::archive_file_name(&package.topic), bytes))
    }

    fn begin_scene_job(&self, index: usize, scope: SceneScope) -> Result<SceneJob, StudioError> {
        let mut state = self.state.write();
        let session = &mut *state;
        let package = session.package.as_mut().ok_or(StudioError::NoPackage)?;
        if index >= package.scenes.len() {
            return Err(StudioError::SceneIndex(index));
        }
        let references = reference_images(package, &session.characters, scope);
        let scene = &mut package.scenes[index];
        scene.is_loading = true;
        Ok(SceneJob {
            topic: package.topic.clone(),
            format: package.format,
            description: package.scenes[index].description.clone(),
            dialogue: package.scenes[index].dialogue.clone(),
            aspect_ratio: session.settings.aspect_ratio,
            references,
            revision: package.scenes[index].revision,
        })
    }

    async fn scene_action_prompt(
        &self,
        job: &SceneJob,
        image: &str,
    ) -> (Option<Value>, Option<GenerationError>) {
        match self
            .gateway
            .generate_action_prompt(&job.topic, job.format, &job.description, &job.dialogue, image)
            .await
        {
            Ok(value) => (Some(value), None),
            Err(e) => {
                tracing::warn!(error = %e, "action prompt failed; committing image without one");
                (None, Some(e))
            }
        }
    }

    fn commit_scene(&self, index: usize, revision: u64, image: String, action_prompt: Option<Value>) {
        let mut state = self.state.write();
        let Some(scene) = state
            .package
            .as_mut()
            .and_then(|p| p.scenes.get_mut(index))
        else {
            return;
        };
        scene.is_loading = false;
        if scene.revision != revision {
            tracing::warn!(scene = scene.scene_number, "discarding stale scene write");
            return;
        }
        scene.image_url = Some(image);
        scene.action_prompt = action_prompt;
        scene.revision += 1;
    }

    fn commit_character(&self, index: usize, revision: u64, image: String) {
        let mut state = self.state.write();
        let Some(character) = state.characters.get_mut(index) else {
            return;
        };
        character.is_loading = false;
        if character.revision != revision {
            tracing::warn!(character = %character.name, "discarding stale portrait write");
            return;
        }
        character.image_url = Some(image);
        character.revision += 1;
    }

    fn clear_scene_loading(&self, index: usize) {
        let mut state = self.state.write();
        if let Some(scene) = state
            .package
            .as_mut()
            .and_then(|p| p.scenes.get_mut(index))
        {
            scene.is_loading = false;
        }
    }

    fn clear_character_loading(&self, index: usize) {
        let mut state = self.state.write();
        if let Some(character) = state.characters.get_mut(index) {
            character.is_loading = false;
        }
    }
}
