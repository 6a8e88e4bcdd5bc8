use std::collections::HashSet;
use storyboard::{Character, ReelPackage};

/// Which scene images participate in a reference set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneScope {
    /// Scenes with index < n: first generation of scene n.
    Before(usize),
    /// Every scene except n: regeneration of scene n.
    Excluding(usize),
    /// Every scene: thumbnail regeneration.
    All,
}

impl SceneScope {
    fn includes(&self, index: usize) -> bool {
        match *self {
            SceneScope::Before(n) => index < n,
            SceneScope::Excluding(n) => index != n,
            SceneScope::All => true,
        }
    }
}

/// De-duplicated union of character portraits, the thumbnail, and the
/// in-scope scene images, snapshotted at call time. Order carries no
/// meaning beyond being handed to the model as context.
pub fn reference_images(
    package: &ReelPackage,
    characters: &[Character],
    scope: SceneScope,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut references = Vec::new();

    let portraits = characters.iter().filter_map(|c| c.image_url.as_deref());
    let thumbnail = std::iter::once(package.thumbnail.image_url.as_str());
    let scenes = package
        .scenes
        .iter()
        .enumerate()
        .filter(|(i, _)| scope.includes(*i))
        .filter_map(|(_, s)| s.image_url.as_deref());

    for image in portraits.chain(thumbnail).chain(scenes) {
        if !image.is_empty() && seen.insert(image) {
            references.push(image.to_string());
        }
    }
    references
}
