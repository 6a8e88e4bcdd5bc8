/// Reel package data model
///
/// In-memory model for one generated video package: thumbnail, ordered
/// scenes, and an optional character roster. Pure data plus the small
/// parsers the rest of the workspace shares: no I/O, no network.

pub mod characters;
pub mod data_url;
pub mod package;
pub mod slug;

pub use characters::{find_block, parse_blocks, CharacterBlock};
pub use data_url::DecodedImage;
pub use package::{
    AspectRatio, Character, ContentFormat, ReelPackage, Scene, ScriptFormat, Thumbnail,
};
pub use slug::slugify;
