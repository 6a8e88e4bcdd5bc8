/// Free-text character description parser
///
/// Users paste character sheets as plain text. Grammar: a block is a
/// paragraph separated by one or more blank lines; a line whose key is
/// `Name:` (case-insensitive) identifies the block and carries the
/// character's name. Everything else in the block is description text.

/// One parsed description block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterBlock {
    pub name: String,
    /// The full block text, including the `Name:` line.
    pub body: String,
}

/// Split description text into named blocks. Blocks without a
/// recognizable `Name:` line are ignored.
pub fn parse_blocks(text: &str) -> Vec<CharacterBlock> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .filter_map(|block| {
            block_name(block).map(|name| CharacterBlock {
                name,
                body: block.to_string(),
            })
        })
        .collect()
}

/// Find the description block for `name`, matched case-insensitively.
pub fn find_block<'a>(blocks: &'a [CharacterBlock], name: &str) -> Option<&'a CharacterBlock> {
    let wanted = name.trim().to_lowercase();
    blocks
        .iter()
        .find(|block| block.name.to_lowercase() == wanted)
}

fn block_name(block: &str) -> Option<String> {
    block.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case("name") {
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        } else {
            None
        }
    })
}
