/// Filesystem-safe slug for archive and entry names: every
/// non-alphanumeric character becomes `_`, then lowercase.
pub fn slugify(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_lowercase()
}
