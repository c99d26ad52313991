//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::aseprite::{read_document, CelContent, ColorDepth, Document, LayerKind};
use crate::composition::DocumentContext;

use super::{EXIT_ERROR, EXIT_SUCCESS};

/// Execute the inspect command
pub fn run_inspect(file: &Path) -> ExitCode {
    match read_document(file) {
        Ok(document) => {
            print!("{}", describe_document(&file.display().to_string(), &document));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}: {}", file.display(), e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Human-readable overview of a decoded document.
pub fn describe_document(label: &str, document: &Document) -> String {
    let header = &document.header;
    let depth = match header.color_depth {
        ColorDepth::Rgba => "rgba",
        ColorDepth::Indexed => "indexed",
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", label));
    out.push_str(&format!("  Size: {}x{} ({})\n", header.width, header.height, depth));
    if header.color_depth == ColorDepth::Indexed {
        out.push_str(&format!("  Transparent index: {}\n", header.transparent_index));
    }

    let layers: Vec<_> = document.layers().collect();
    out.push_str(&format!("  Layers ({}):\n", layers.len()));
    for layer in layers {
        let kind = match layer.kind {
            LayerKind::Normal => "normal",
            LayerKind::Group => "group",
            LayerKind::Tilemap => "tilemap",
        };
        let mut flags = Vec::new();
        if !layer.visible {
            flags.push("hidden");
        }
        if layer.reference {
            flags.push("reference");
        }
        let indent = "  ".repeat(layer.child_level as usize);
        out.push_str(&format!(
            "    [{}] {}{} ({}, opacity {}){}\n",
            layer.index,
            indent,
            layer.name,
            kind,
            layer.opacity,
            if flags.is_empty() { String::new() } else { format!(" {}", flags.join(", ")) }
        ));
    }

    out.push_str(&format!("  Frames ({}):\n", document.frames.len()));
    for (index, frame) in document.frames.iter().enumerate() {
        let cels = frame.cels().count();
        let linked = frame.cels().filter(|c| matches!(c.content, CelContent::Linked { .. })).count();
        out.push_str(&format!("    {}: {}ms, {} cel(s)", index, frame.duration_ms, cels));
        if linked > 0 {
            out.push_str(&format!(", {} linked", linked));
        }
        out.push('\n');
    }

    let tags: Vec<_> = document.tags().collect();
    if !tags.is_empty() {
        out.push_str(&format!("  Tags ({}):\n", tags.len()));
        for tag in tags {
            let repeat = if tag.repeat == 0 { "forever".to_string() } else { format!("x{}", tag.repeat) };
            out.push_str(&format!(
                "    {}: frames {}..={} {} {}\n",
                tag.name,
                tag.from,
                tag.to,
                tag.direction.as_str(),
                repeat
            ));
        }
    }

    let (ctx, _) = DocumentContext::new(document);
    match ctx.palette() {
        Some(palette) => out.push_str(&format!("  Palette: {} color(s)\n", palette.colors.len())),
        None => out.push_str("  Palette: none\n"),
    }

    out
}
