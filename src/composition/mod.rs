//! Frame compositing - flattening document layers into textures

mod assets;
mod blend;
mod context;
mod error;
mod render;
mod resolve;

// Re-export public API
pub use assets::{
    frame_texture_name, image_texture, layer_assets, layer_texture_name, sprite_assets, DocumentAssets,
};
pub use context::DocumentContext;
pub use error::{Severity, Warning};
pub use render::{composite_frame, composite_layer, flatten_document, FrameImage};
