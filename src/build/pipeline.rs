//! Build pipeline orchestration.
//!
//! Every atlas configuration runs discovery, asset derivation, packing,
//! rendering and PNG output in isolation; a failure is recorded on that
//! configuration's [`TargetResult`] and the next configuration proceeds.
//! Once all configurations are done the collected results are merged into
//! one descriptor.

use crate::aseprite::{read_document, ParseError};
use crate::atlas::{plan_layout, render_atlas, AtlasContents, RenderPolicy};
use crate::build::{
    atlas_target_id, discover_sources, BuildContext, BuildSummary, DiscoveryError, SourceFile, SourceKind,
    TargetResult, DESCRIPTOR_TARGET,
};
use crate::composition::{flatten_document, image_texture, layer_assets, sprite_assets, DocumentAssets, Warning};
use crate::config::{AssetKind, AtlasConfig};
use crate::export::{Descriptor, ExportError, ExportOptions, Exporter, JsonExporter, RustExporter};
use crate::glyph::{extract_glyphs, load_font, FontError};
use crate::models::{BuildResult, FontInfo};
use crate::output::{load_png, save_png, OutputError};
use crate::packer::{BinPacker, ShelfPacker};
use crate::tileset::{slice_tileset, TilesetError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

/// Error during build execution.
#[derive(Debug)]
pub enum BuildError {
    /// Discovery error
    Discovery(DiscoveryError),
    /// A layered document could not be decoded
    Document { path: PathBuf, source: ParseError },
    /// A static image could not be decoded
    Image { path: PathBuf, source: OutputError },
    /// Tileset cannot be sliced
    Tileset(TilesetError),
    /// Font file cannot be loaded
    Font(FontError),
    /// Atlas image could not be written
    Output(OutputError),
    /// Descriptor could not be written
    Export(ExportError),
    /// `--only` named an atlas that is not configured
    UnknownAtlas(String),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Discovery(e) => write!(f, "Discovery error: {}", e),
            BuildError::Document { path, source } => write!(f, "{}: {}", path.display(), source),
            BuildError::Image { path, source } => write!(f, "{}: {}", path.display(), source),
            BuildError::Tileset(e) => write!(f, "Tileset error: {}", e),
            BuildError::Font(e) => write!(f, "Font error: {}", e),
            BuildError::Output(e) => write!(f, "Failed to write atlas: {}", e),
            BuildError::Export(e) => write!(f, "Failed to write descriptor: {}", e),
            BuildError::UnknownAtlas(name) => write!(f, "Unknown atlas '{}'", name),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<DiscoveryError> for BuildError {
    fn from(e: DiscoveryError) -> Self {
        BuildError::Discovery(e)
    }
}

impl From<TilesetError> for BuildError {
    fn from(e: TilesetError) -> Self {
        BuildError::Tileset(e)
    }
}

impl From<FontError> for BuildError {
    fn from(e: FontError) -> Self {
        BuildError::Font(e)
    }
}

impl From<ExportError> for BuildError {
    fn from(e: ExportError) -> Self {
        BuildError::Export(e)
    }
}

/// Output of one atlas configuration.
#[derive(Debug)]
pub struct AtlasBuild {
    pub result: BuildResult,
    /// Where the atlas image was written
    pub image_path: PathBuf,
    pub warnings: Vec<Warning>,
}

/// Build pipeline for executing builds.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Bin packing heuristic shared by every configuration
    packer: Box<dyn BinPacker>,
    /// Whether to do a dry run (discover only, write nothing)
    dry_run: bool,
}

impl BuildPipeline {
    /// Create a new build pipeline using the shelf packer.
    pub fn new(context: BuildContext) -> Self {
        Self { context, packer: Box::new(ShelfPacker), dry_run: false }
    }

    /// Replace the bin packer.
    pub fn with_packer(mut self, packer: Box<dyn BinPacker>) -> Self {
        self.packer = packer;
        self
    }

    /// Set dry-run mode (don't actually build).
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the build pipeline.
    ///
    /// Fails only when the atlas filter names an unknown configuration;
    /// per-configuration failures are reported in the summary.
    pub fn build(&self) -> Result<BuildSummary, BuildError> {
        let start = Instant::now();

        if let Some(filter) = self.context.atlas_filter() {
            if let Some(unknown) = filter.iter().find(|name| self.context.config().atlas(name).is_none()) {
                return Err(BuildError::UnknownAtlas(unknown.clone()));
            }
        }

        let atlases = self.context.selected_atlases();
        if self.context.is_verbose() {
            log::info!("Build plan: {} atlas(es)", atlases.len());
            for atlas in &atlases {
                log::info!("  - {} ({})", atlas.name, atlas.kind.as_str());
            }
        }

        let mut summary = BuildSummary::new();
        let mut results = Vec::new();
        for atlas in atlases {
            let (target, result) = self.execute_atlas(atlas);
            summary.add_result(target);
            results.extend(result);
        }

        if !self.dry_run {
            summary.add_result(self.emit_descriptor(&results));
        }

        Ok(summary.with_duration(start.elapsed()))
    }

    /// Run one configuration and convert the outcome into a target result.
    fn execute_atlas(&self, atlas: &AtlasConfig) -> (TargetResult, Option<BuildResult>) {
        let start = Instant::now();
        let target_id = atlas_target_id(&atlas.name);
        log::debug!("Building: {} ...", target_id);

        if self.dry_run {
            return match self.discover(atlas) {
                Ok(sources) => {
                    log::info!("{}: {} source file(s)", atlas.name, sources.len());
                    (TargetResult::skipped(target_id), None)
                }
                Err(e) => {
                    log::error!("{}: {}", atlas.name, e);
                    (TargetResult::failed(target_id, e.to_string(), start.elapsed()), None)
                }
            };
        }

        match self.build_atlas(atlas) {
            Ok(build) => {
                let duration = start.elapsed();
                log::debug!("  Done in {:?}", duration);
                let warnings = build.warnings.iter().map(|w| w.to_string()).collect();
                let target =
                    TargetResult::success(target_id, vec![build.image_path], duration).with_warnings(warnings);
                (target, Some(build.result))
            }
            Err(e) => {
                log::error!("{}: {}", atlas.name, e);
                (TargetResult::failed(target_id, e.to_string(), start.elapsed()), None)
            }
        }
    }

    fn discover(&self, atlas: &AtlasConfig) -> Result<Vec<SourceFile>, DiscoveryError> {
        discover_sources(&self.context.src_dir(atlas), atlas.kind, atlas.prefix.as_deref(), atlas.recursive)
    }

    /// Build a single atlas configuration and write its image.
    pub fn build_atlas(&self, atlas: &AtlasConfig) -> Result<AtlasBuild, BuildError> {
        let config = self.context.config();
        let sources = self.discover(atlas)?;
        let (mut contents, mut warnings) = self.gather_contents(atlas, &sources)?;
        if contents.is_empty() {
            log::info!("{}: no textures, tiles or glyphs to pack", atlas.name);
        }
        if contents.animations.is_empty() && atlas.kind == AssetKind::Sprites {
            log::debug!("{}: no animations", atlas.name);
        }

        let policy = RenderPolicy::new(config.effective_bleed(atlas));
        let bin_size = config.effective_bin_size(atlas);
        let layout = plan_layout(&atlas.name, &mut contents, &policy, bin_size, self.packer.as_ref());
        warnings.extend(layout.warnings.iter().cloned());

        let rendered = render_atlas(
            &atlas.name,
            config.effective_image(atlas),
            contents,
            &layout,
            &policy,
            config.effective_crop(atlas),
        );
        warnings.extend(rendered.warnings);

        let image_path = self.context.image_path(atlas);
        save_png(&rendered.image, &image_path).map_err(BuildError::Output)?;

        for warning in &warnings {
            warning.log();
        }
        Ok(AtlasBuild { result: rendered.result, image_path, warnings })
    }

    /// Decode every source and derive the items this configuration packs.
    fn gather_contents(
        &self,
        atlas: &AtlasConfig,
        sources: &[SourceFile],
    ) -> Result<(AtlasContents, Vec<Warning>), BuildError> {
        let config = self.context.config();
        let mut contents = AtlasContents::default();
        let mut warnings = Vec::new();

        match atlas.kind {
            AssetKind::Sprites | AssetKind::Interface => {
                let mut names = HashSet::new();
                for source in sources {
                    let assets = match source.kind {
                        SourceKind::Document => {
                            let document = read_document(&source.path)
                                .map_err(|e| BuildError::Document { path: source.path.clone(), source: e })?;
                            if atlas.kind == AssetKind::Interface {
                                layer_assets(&source.name, &document)
                            } else {
                                sprite_assets(&source.name, &document)
                            }
                        }
                        SourceKind::Image => {
                            let image = load_png(&source.path)
                                .map_err(|e| BuildError::Image { path: source.path.clone(), source: e })?;
                            match image_texture(&source.name, image) {
                                Some(texture) => DocumentAssets { textures: vec![texture], ..Default::default() },
                                None => {
                                    log::info!("{}: image is fully transparent, skipped", source.name);
                                    continue;
                                }
                            }
                        }
                        SourceKind::Font => continue,
                    };

                    warnings.extend(assets.warnings);
                    let mut kept = HashSet::new();
                    for texture in assets.textures {
                        if names.insert(texture.name.clone()) {
                            kept.insert(texture.name.clone());
                            contents.textures.push(texture);
                        } else {
                            warnings.push(Warning::new(format!(
                                "{}: texture '{}' already defined, skipped",
                                atlas.name, texture.name
                            )));
                        }
                    }
                    for animation in assets.animations {
                        if kept.contains(&animation.first) && kept.contains(&animation.last) {
                            contents.animations.push(animation);
                        } else {
                            warnings.push(Warning::new(format!(
                                "{}: animation '{}' refers to a skipped texture, dropped",
                                atlas.name, animation.name
                            )));
                        }
                    }
                }
            }
            AssetKind::Tilesets => {
                let tile_size = config.effective_tile_size(atlas);
                for source in sources {
                    let image = match source.kind {
                        SourceKind::Document => {
                            let document = read_document(&source.path)
                                .map_err(|e| BuildError::Document { path: source.path.clone(), source: e })?;
                            let (image, flatten_warnings) = flatten_document(&document);
                            warnings.extend(flatten_warnings.into_iter().map(|w| w.in_source(&source.name)));
                            image
                        }
                        SourceKind::Image => load_png(&source.path)
                            .map_err(|e| BuildError::Image { path: source.path.clone(), source: e })?,
                        SourceKind::Font => continue,
                    };
                    let tileset = slice_tileset(&source.name, image, tile_size)?;
                    if tileset.tiles.is_empty() {
                        log::info!("{}: tileset has no opaque tiles", source.name);
                    }
                    contents.tilesets.push(tileset);
                }
            }
            AssetKind::Font => {
                let fonts = sources
                    .iter()
                    .filter(|s| s.kind == SourceKind::Font)
                    .map(|s| load_font(&s.path))
                    .collect::<Result<Vec<_>, _>>()?;
                if fonts.is_empty() {
                    log::info!("{}: no font files found", atlas.name);
                } else {
                    let size = config.effective_font_size(atlas);
                    let charset = config.effective_charset(atlas);
                    let (glyphs, glyph_warnings) = extract_glyphs(&fonts, size, charset);
                    contents.glyphs = glyphs;
                    warnings.extend(glyph_warnings.into_iter().map(|w| w.in_source(&atlas.name)));
                    contents.font = Some(FontInfo { size, charset: charset.to_string() });
                }
            }
        }

        Ok((contents, warnings))
    }

    /// Merge all collected results and write the descriptor files.
    fn emit_descriptor(&self, results: &[BuildResult]) -> TargetResult {
        let start = Instant::now();
        let descriptor = Descriptor::merge(results);
        log::debug!(
            "Descriptor: {} atlas(es), {} texture(s), {} animation(s)",
            descriptor.atlases.len(),
            descriptor.textures.len(),
            descriptor.animations.len()
        );

        match self.write_descriptor(&descriptor) {
            Ok(outputs) => TargetResult::success(DESCRIPTOR_TARGET.to_string(), outputs, start.elapsed()),
            Err(e) => {
                log::error!("{}", e);
                TargetResult::failed(DESCRIPTOR_TARGET.to_string(), e.to_string(), start.elapsed())
            }
        }
    }

    fn write_descriptor(&self, descriptor: &Descriptor) -> Result<Vec<PathBuf>, BuildError> {
        let options = ExportOptions::default();
        let mut outputs = Vec::new();

        let rust_path = self.context.descriptor_path();
        RustExporter::new().export(descriptor, &rust_path, &options)?;
        outputs.push(rust_path);

        if let Some(json_path) = self.context.json_path() {
            JsonExporter::new().export(descriptor, &json_path, &options)?;
            outputs.push(json_path);
        }

        Ok(outputs)
    }
}

/// Builder for configuring and running builds.
pub struct Build {
    context: BuildContext,
    packer: Option<Box<dyn BinPacker>>,
    dry_run: bool,
    verbose: bool,
    filter: Option<Vec<String>>,
}

impl Build {
    /// Create a new build builder.
    pub fn new(context: BuildContext) -> Self {
        Self { context, packer: None, dry_run: false, verbose: false, filter: None }
    }

    /// Set the bin packer.
    pub fn packer(mut self, packer: Box<dyn BinPacker>) -> Self {
        self.packer = Some(packer);
        self
    }

    /// Set dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set verbose mode.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build only the named atlases. An empty list builds everything.
    pub fn filter(mut self, atlases: Vec<String>) -> Self {
        self.filter = if atlases.is_empty() { None } else { Some(atlases) };
        self
    }

    /// Run the build.
    pub fn run(self) -> Result<BuildSummary, BuildError> {
        let mut context = self.context.with_verbose(self.verbose);
        if let Some(filter) = self.filter {
            context = context.with_filter(filter);
        }

        let mut pipeline = BuildPipeline::new(context).with_dry_run(self.dry_run);
        if let Some(packer) = self.packer {
            pipeline = pipeline.with_packer(packer);
        }
        pipeline.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::packer::{PackOutcome, PackRect};
    use image::{Rgba, RgbaImage};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn context(root: &Path, toml: &str) -> BuildContext {
        BuildContext::new(parse_config(toml).unwrap(), root.to_path_buf())
    }

    fn write_png(path: &Path, image: &RgbaImage) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image.save(path).unwrap();
    }

    fn solid(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]))
    }

    struct RejectAll;

    impl BinPacker for RejectAll {
        fn pack(&self, _bin_width: u32, _bin_height: u32, _rects: &[PackRect]) -> PackOutcome {
            PackOutcome { placements: Vec::new(), overflow: true }
        }
    }

    const SPRITES: &str = r#"
[project]
name = "game"

[[atlas]]
name = "sprites"
src = "art"
bin_size = 64
"#;

    #[test]
    fn test_build_png_sprites() {
        let temp = TempDir::new().unwrap();
        let mut coin = RgbaImage::new(6, 6);
        for y in 1..4 {
            for x in 2..5 {
                coin.put_pixel(x, y, Rgba([255, 200, 0, 255]));
            }
        }
        write_png(&temp.path().join("art/items/coin.png"), &coin);

        let pipeline = BuildPipeline::new(context(temp.path(), SPRITES));
        let summary = pipeline.build().unwrap();
        assert!(summary.is_success(), "{}", summary.summary());

        let atlas = image::open(temp.path().join("build/sprites.png")).unwrap().to_rgba8();
        assert!(atlas.width() <= 64 && atlas.height() <= 64);

        let descriptor = fs::read_to_string(temp.path().join("build/atlas.rs")).unwrap();
        assert!(descriptor.contains("ItemsCoin"));
        assert!(descriptor.contains("pub mod sprites"));
    }

    #[test]
    fn test_build_atlas_records_trim() {
        let temp = TempDir::new().unwrap();
        let mut icon = RgbaImage::new(4, 4);
        icon.put_pixel(3, 2, Rgba([1, 2, 3, 255]));
        write_png(&temp.path().join("art/icon.png"), &icon);

        let ctx = context(temp.path(), SPRITES);
        let atlas = ctx.config().atlases[0].clone();
        let build = BuildPipeline::new(ctx).build_atlas(&atlas).unwrap();

        let texture = &build.result.textures[0];
        assert_eq!(texture.name, "icon");
        assert_eq!((texture.rect.w, texture.rect.h), (1, 1));
        assert_eq!((texture.trim.left, texture.trim.top), (3, 2));
        assert_eq!(build.result.image_path, PathBuf::from("build/sprites.png"));
    }

    #[test]
    fn test_missing_source_dir_fails_only_that_atlas() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("ui/button.png"), &solid(4, 4));
        let toml = r#"
[project]
name = "game"

[[atlas]]
name = "sprites"
src = "missing"

[[atlas]]
name = "ui"
kind = "interface"
src = "ui"
"#;
        let summary = BuildPipeline::new(context(temp.path(), toml)).build().unwrap();

        assert!(summary.target("atlas:sprites").unwrap().status.is_failure());
        assert!(summary.target("atlas:ui").unwrap().is_success());
        assert!(summary.target(DESCRIPTOR_TARGET).unwrap().is_success());
        let descriptor = fs::read_to_string(temp.path().join("build/atlas.rs")).unwrap();
        assert!(descriptor.contains("pub mod ui"));
        assert!(!descriptor.contains("pub mod sprites"));
    }

    #[test]
    fn test_tileset_not_divisible_is_fatal() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("tiles/ground.png"), &solid(10, 8));
        let toml = r#"
[project]
name = "game"

[[atlas]]
name = "tiles"
kind = "tilesets"
src = "tiles"
tile_size = 8
"#;
        let ctx = context(temp.path(), toml);
        let atlas = ctx.config().atlases[0].clone();
        let result = BuildPipeline::new(ctx).build_atlas(&atlas);
        assert!(matches!(result, Err(BuildError::Tileset(TilesetError::NotDivisible { .. }))));
    }

    #[test]
    fn test_tileset_slices_png() {
        let temp = TempDir::new().unwrap();
        let mut sheet = RgbaImage::new(16, 8);
        for y in 0..8 {
            for x in 8..16 {
                sheet.put_pixel(x, y, Rgba([0, 128, 0, 255]));
            }
        }
        write_png(&temp.path().join("tiles/grass.png"), &sheet);
        let toml = r#"
[project]
name = "game"

[[atlas]]
name = "tiles"
kind = "tilesets"
src = "tiles"
tile_size = 8
bin_size = 64
"#;
        let ctx = context(temp.path(), toml);
        let atlas = ctx.config().atlases[0].clone();
        let build = BuildPipeline::new(ctx).build_atlas(&atlas).unwrap();

        let tileset = &build.result.tilesets[0];
        assert_eq!((tileset.columns, tileset.rows), (2, 1));
        assert_eq!(tileset.tiles.len(), 1);
        assert!(tileset.tile_at(0, 0).is_none());
        assert!(tileset.tile_at(1, 0).is_some());
    }

    #[test]
    fn test_overflow_is_recoverable() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("art/a.png"), &solid(4, 4));

        let pipeline = BuildPipeline::new(context(temp.path(), SPRITES)).with_packer(Box::new(RejectAll));
        let summary = pipeline.build().unwrap();

        let target = summary.target("atlas:sprites").unwrap();
        assert!(target.is_success());
        assert!(target.warnings.iter().any(|w| w.contains("sprites") && w.contains("64x64")));
        let descriptor = fs::read_to_string(temp.path().join("build/atlas.rs")).unwrap();
        assert!(descriptor.contains("TextureName::None => None"));
        assert!(!descriptor.contains("TextureName::A =>"));
    }

    #[test]
    fn test_font_atlas_without_fonts_is_empty() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("fonts")).unwrap();
        let toml = r#"
[project]
name = "game"

[[atlas]]
name = "text"
kind = "font"
src = "fonts"
"#;
        let ctx = context(temp.path(), toml);
        let atlas = ctx.config().atlases[0].clone();
        let build = BuildPipeline::new(ctx).build_atlas(&atlas).unwrap();
        assert!(build.result.glyphs.is_empty());
        assert!(build.result.font.is_none());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("art/a.png"), &solid(2, 2));

        let summary = BuildPipeline::new(context(temp.path(), SPRITES)).with_dry_run(true).build().unwrap();
        assert_eq!(summary.skipped_count(), 1);
        assert!(!temp.path().join("build").exists());
    }

    #[test]
    fn test_unknown_filter_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), SPRITES).with_filter(vec!["nope".to_string()]);
        assert!(matches!(BuildPipeline::new(ctx).build(), Err(BuildError::UnknownAtlas(name)) if name == "nope"));
    }

    #[test]
    fn test_json_descriptor_written_when_configured() {
        let temp = TempDir::new().unwrap();
        write_png(&temp.path().join("art/a.png"), &solid(2, 2));
        let toml = format!("{}\n", SPRITES.replace("name = \"game\"", "name = \"game\"\njson = \"out/atlas.json\""));

        let summary = Build::new(context(temp.path(), &toml)).filter(Vec::new()).run().unwrap();
        assert!(summary.is_success());
        let json = fs::read_to_string(temp.path().join("out/atlas.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["textures"][0]["name"], "a");
    }
}
