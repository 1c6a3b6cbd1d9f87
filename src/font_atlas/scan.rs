//! Glyph source discovery.
//!
//! A glyph source is a regular file named `<one character>.<image extension>`, e.g. `A.png`.
//! Everything else in the directory is ignored.

use anyhow::{bail, Context, Result};
use image::ImageFormat;
use log::debug;
use std::{fs, path::{Path, PathBuf}};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphSource {
    pub path: PathBuf,
    pub ch: char,
}

/// Single-character stem of `path`, if it has one.
pub fn glyph_char(path: &Path) -> Option<char> {
    let stem = path.file_stem()?.to_str()?;
    let mut chars = stem.chars();
    let ch = chars.next()?;
    if chars.next().is_some() { return None; }
    Some(ch)
}

/// True when the extension names an image format this build can decode.
pub fn is_decodable_image(path: &Path) -> bool {
    path.extension()
        .and_then(ImageFormat::from_extension)
        .is_some_and(|f| f.reading_enabled())
}

/// List qualifying glyph files in lexicographic file-name order.
pub fn scan_glyph_sources(dir: &Path) -> Result<Vec<GlyphSource>> {
    if !dir.is_dir() { bail!("glyph source directory {} does not exist", dir.display()); }
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read dir {}", dir.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .with_context(|| format!("list {}", dir.display()))?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut out = Vec::new();
    for path in entries {
        if !path.is_file() { continue; }
        if !is_decodable_image(&path) { debug!("skip {} (not a decodable image)", path.display()); continue; }
        let Some(ch) = glyph_char(&path) else { debug!("skip {} (stem is not one character)", path.display()); continue; };
        out.push(GlyphSource { path, ch });
    }
    Ok(out)
}
