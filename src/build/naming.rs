//! Asset names derived from source paths.

use std::path::{Component, Path};

/// Name of a source document: its path relative to the source directory,
/// without extension, with `/` separators on every platform.
///
/// `hero/walk.aseprite` becomes `hero/walk`.
pub fn document_name(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_name_flat() {
        assert_eq!(document_name(Path::new("hero.aseprite")), "hero");
    }

    #[test]
    fn test_document_name_nested() {
        assert_eq!(document_name(Path::new("ui/panel/close.png")), "ui/panel/close");
    }

    #[test]
    fn test_document_name_keeps_inner_dots() {
        assert_eq!(document_name(Path::new("fx/boom.big.ase")), "fx/boom.big");
    }

    #[test]
    fn test_document_name_skips_current_dir() {
        assert_eq!(document_name(Path::new("./coin.png")), "coin");
    }
}
