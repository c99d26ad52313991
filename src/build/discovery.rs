//! Source file discovery for the build system.
//!
//! Each atlas configuration names one source directory. Files are matched by
//! extension for the configuration's kind and by an optional file-name
//! prefix, then ordered lexicographically by their path relative to that
//! directory so every run sees the same sequence.

use crate::build::naming::document_name;
use crate::config::AssetKind;
use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

/// Error during source discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Source directory does not exist or is not a directory
    MissingDirectory(PathBuf),
    /// Invalid glob pattern
    InvalidPattern(String, glob::PatternError),
    /// IO error during file enumeration
    Io(std::io::Error),
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::MissingDirectory(path) => {
                write!(f, "Source directory not found: {}", path.display())
            }
            DiscoveryError::InvalidPattern(pattern, err) => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, err)
            }
            DiscoveryError::Io(err) => write!(f, "IO error during discovery: {}", err),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Io(err)
    }
}

/// How a discovered file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Layered animation document (`.ase`, `.aseprite`)
    Document,
    /// Static PNG image
    Image,
    /// TrueType or OpenType font
    Font,
}

impl SourceKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<SourceKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ase" | "aseprite" => Some(SourceKind::Document),
            "png" => Some(SourceKind::Image),
            "ttf" | "otf" => Some(SourceKind::Font),
            _ => None,
        }
    }
}

/// A file selected for an atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the source directory
    pub relative: PathBuf,
    /// Document name used as the base of every asset name
    pub name: String,
    pub kind: SourceKind,
}

/// Discover the files an atlas configuration consumes.
///
/// # Arguments
/// - `src_dir` - Source directory of the configuration
/// - `kind` - Asset kind, selects the accepted extensions
/// - `prefix` - Only files whose name starts with this are kept
/// - `recursive` - Whether sub-directories are searched
///
/// # Returns
/// Matching files ordered by relative path.
pub fn discover_sources(
    src_dir: &Path,
    kind: AssetKind,
    prefix: Option<&str>,
    recursive: bool,
) -> Result<Vec<SourceFile>, DiscoveryError> {
    if !src_dir.is_dir() {
        return Err(DiscoveryError::MissingDirectory(src_dir.to_path_buf()));
    }

    let base = Pattern::escape(&src_dir.to_string_lossy());
    let pattern = if recursive { format!("{}/**/*", base) } else { format!("{}/*", base) };
    let paths = glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

    let extensions = kind.extensions();
    let mut files = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                // Log but continue on glob errors
                log::warn!("error reading path: {}", e);
                continue;
            }
        };
        if !path.is_file() || !has_extension(&path, extensions) || !has_prefix(&path, prefix) {
            continue;
        }
        let Some(source_kind) = SourceKind::from_path(&path) else {
            continue;
        };
        let relative = path.strip_prefix(src_dir).map(Path::to_path_buf).unwrap_or_else(|_| path.clone());
        let name = document_name(&relative);
        files.push(SourceFile { path, relative, name, kind: source_kind });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn has_prefix(path: &Path, prefix: Option<&str>) -> bool {
    match prefix {
        None => true,
        Some(prefix) => path.file_name().and_then(|n| n.to_str()).map(|n| n.starts_with(prefix)).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap().write_all(b"{}").unwrap();
        path
    }

    fn names(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_discover_sprites_filters_extensions() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "hero.aseprite");
        create_test_file(temp.path(), "coin.png");
        create_test_file(temp.path(), "notes.txt");
        create_test_file(temp.path(), "font.ttf");

        let files = discover_sources(temp.path(), AssetKind::Sprites, None, true).unwrap();
        assert_eq!(names(&files), vec!["coin", "hero"]);
        assert_eq!(files[0].kind, SourceKind::Image);
        assert_eq!(files[1].kind, SourceKind::Document);
    }

    #[test]
    fn test_discover_recursive_order() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "b.ase");
        create_test_file(temp.path(), "a/z.ase");
        create_test_file(temp.path(), "a/deep/c.ase");

        let files = discover_sources(temp.path(), AssetKind::Sprites, None, true).unwrap();
        assert_eq!(names(&files), vec!["a/deep/c", "a/z", "b"]);
        assert_eq!(files[0].relative, PathBuf::from("a/deep/c.ase"));
    }

    #[test]
    fn test_discover_non_recursive() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "top.ase");
        create_test_file(temp.path(), "sub/nested.ase");

        let files = discover_sources(temp.path(), AssetKind::Sprites, None, false).unwrap();
        assert_eq!(names(&files), vec!["top"]);
    }

    #[test]
    fn test_discover_prefix_matches_file_name() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "hero_idle.ase");
        create_test_file(temp.path(), "enemy.ase");
        create_test_file(temp.path(), "sub/hero_run.ase");

        let files = discover_sources(temp.path(), AssetKind::Sprites, Some("hero_"), true).unwrap();
        assert_eq!(names(&files), vec!["hero_idle", "sub/hero_run"]);
    }

    #[test]
    fn test_discover_fonts_only() {
        let temp = TempDir::new().unwrap();
        create_test_file(temp.path(), "Mono.TTF");
        create_test_file(temp.path(), "sans.otf");
        create_test_file(temp.path(), "icon.png");

        let files = discover_sources(temp.path(), AssetKind::Font, None, true).unwrap();
        assert_eq!(names(&files), vec!["Mono", "sans"]);
        assert!(files.iter().all(|f| f.kind == SourceKind::Font));
    }

    #[test]
    fn test_discover_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = discover_sources(&temp.path().join("nope"), AssetKind::Sprites, None, true);
        assert!(matches!(result, Err(DiscoveryError::MissingDirectory(_))));
    }

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path(Path::new("a.ASE")), Some(SourceKind::Document));
        assert_eq!(SourceKind::from_path(Path::new("a.png")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(Path::new("a.otf")), Some(SourceKind::Font));
        assert_eq!(SourceKind::from_path(Path::new("a.json")), None);
    }
}
