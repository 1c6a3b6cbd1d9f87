pub mod config;
pub mod font_atlas;
pub mod tile_slice;

// Curated re-exports
pub use config::BakerConfig;
pub use font_atlas::{build_atlas, inspect, write_outputs, BuildConfig, CaseMapping, FontDescriptor, GlyphRecord};
pub use tile_slice::{slice_to_dir, SliceConfig};
