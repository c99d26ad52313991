//! Identifier generation for generated source

use std::collections::HashSet;

/// Rust keywords that cannot be used as module names.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern", "false", "fn",
    "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become",
    "box", "do", "final", "gen", "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Split a name into words at any character that is not alphanumeric and
/// at lower-to-upper case transitions.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Identifiers may not start with a digit.
fn guard_digit(ident: String, prefix: &str) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{}{}", prefix, ident)
    } else {
        ident
    }
}

/// `hero/walk.3` becomes `HeroWalk3`.
pub fn camel_case(name: &str) -> String {
    let ident: String = words(name).iter().map(|w| capitalize(w)).collect();
    if ident.is_empty() {
        return "Unnamed".to_string();
    }
    guard_digit(ident, "N")
}

/// `hero/walk.3` becomes `HERO_WALK_3`.
pub fn screaming_snake_case(name: &str) -> String {
    let ident = words(name).iter().map(|w| w.to_ascii_uppercase()).collect::<Vec<_>>().join("_");
    if ident.is_empty() {
        return "UNNAMED".to_string();
    }
    guard_digit(ident, "N")
}

/// `Game Sprites` becomes `game_sprites`.
pub fn snake_case(name: &str) -> String {
    let ident = words(name).iter().map(|w| w.to_ascii_lowercase()).collect::<Vec<_>>().join("_");
    if ident.is_empty() {
        return "unnamed".to_string();
    }
    let ident = guard_digit(ident, "n");
    if KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Hands out identifiers that are unique within one namespace by appending
/// a numeric suffix (`Hero`, `Hero2`, `Hero3`, ...).
#[derive(Debug, Default)]
pub struct IdentAllocator {
    used: HashSet<String>,
}

impl IdentAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark identifiers as taken without returning them.
    pub fn with_reserved(mut self, reserved: &[&str]) -> Self {
        self.used.extend(reserved.iter().map(|s| s.to_string()));
        self
    }

    pub fn allocate(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let separator = if base.ends_with(|c: char| c.is_ascii_digit()) { "_" } else { "" };
        let mut n = 2;
        loop {
            let candidate = format!("{}{}{}", base, separator, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
