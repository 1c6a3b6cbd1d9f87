//! Bitmap-font atlas builder.
//!
//! Packs a directory of single-character glyph images (`A.png`, `b.png`, ...) into one RGBA
//! atlas, left to right in file-name order, and writes a BMFont text descriptor next to it.

pub mod compose;
pub mod descriptor;
pub mod layout;
pub mod scan;

use anyhow::{bail, Context, Result};
use image::RgbaImage;
use log::{info, warn};
use serde::Serialize;
use std::{fs, path::{Path, PathBuf}};

pub use descriptor::{parse_descriptor, DescriptorError, FontDescriptor, GlyphRecord};
pub use layout::{layout_glyphs, AtlasLayout, CaseMapping, Placement, DEFAULT_SPACE_ADVANCE};
pub use scan::{scan_glyph_sources, GlyphSource};

#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub src_dir: PathBuf,
    pub out_png: PathBuf,
    pub out_fnt: PathBuf,
    pub face: String,
    pub size: u32,
    pub mapping: CaseMapping,
    /// Refuse to replace existing output files instead of overwriting them.
    pub no_clobber: bool,
    pub stdout_json: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("font"),
            out_png: PathBuf::from("font.png"),
            out_fnt: PathBuf::from("font.fnt"),
            face: "custom".into(),
            size: 64,
            mapping: CaseMapping::Exact,
            no_clobber: false,
            stdout_json: false,
        }
    }
}

pub struct AtlasArtifact {
    pub image: RgbaImage,
    pub layout: AtlasLayout,
    pub descriptor: FontDescriptor,
    pub png_path: PathBuf,
    pub fnt_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub face: String,
    pub page_file: String,
    pub char_count: usize,
    /// scaleW/scaleH as declared by the descriptor.
    pub declared_dim: (u32, u32),
    /// Actual pixel size of the page image.
    pub atlas_dim: (u32, u32),
    /// Code points whose rectangle leaves the page image.
    pub out_of_bounds: Vec<u32>,
}

impl Inspection {
    pub fn is_consistent(&self) -> bool { self.declared_dim == self.atlas_dim && self.out_of_bounds.is_empty() }
}

/// Page name written into the descriptor: the atlas file name, resolved relative to the descriptor.
pub fn page_file_name(png_path: &Path) -> Result<String> {
    match png_path.file_name().and_then(|n| n.to_str()) {
        Some(n) if !n.contains('"') => Ok(n.to_string()),
        Some(n) => bail!("atlas file name {n:?} cannot be quoted in a descriptor"),
        None => bail!("atlas path {} has no usable file name", png_path.display()),
    }
}

/// Decode all glyphs and assemble atlas + descriptor in memory. Nothing is written; any unreadable
/// glyph aborts the whole build.
pub fn build_atlas(cfg: &BuildConfig) -> Result<AtlasArtifact> {
    if cfg.face.contains('"') { bail!("face name must not contain '\"'"); }
    if cfg.size == 0 { bail!("font size must be > 0"); }
    if cfg.no_clobber {
        for p in [&cfg.out_png, &cfg.out_fnt] {
            if p.exists() { bail!("Refusing to overwrite {} (--no-clobber)", p.display()); }
        }
    }
    let page_file = page_file_name(&cfg.out_png)?;
    if cfg.out_png.parent() != cfg.out_fnt.parent() {
        warn!("atlas and descriptor are in different directories; page file {page_file:?} is resolved next to the descriptor");
    }

    let sources = scan_glyph_sources(&cfg.src_dir)?;
    if sources.is_empty() { bail!("no glyph images (<char>.<image ext>) in {}", cfg.src_dir.display()); }
    info!("packing {} glyph images from {}", sources.len(), cfg.src_dir.display());

    let mut images = Vec::with_capacity(sources.len());
    for s in &sources {
        let img = image::open(&s.path).with_context(|| format!("decode glyph {}", s.path.display()))?.to_rgba8();
        images.push(img);
    }
    let sized: Vec<(char, (u32, u32))> = sources.iter().zip(&images).map(|(s, img)| (s.ch, img.dimensions())).collect();
    let layout = layout_glyphs(&sized, cfg.mapping)?;
    let image = compose::compose_atlas(&images, &layout)?;

    let mut descriptor = FontDescriptor::new(cfg.face.clone(), cfg.size, (layout.width, layout.height), page_file);
    for r in &layout.records { descriptor.push(*r); }

    Ok(AtlasArtifact { image, layout, descriptor, png_path: cfg.out_png.clone(), fnt_path: cfg.out_fnt.clone() })
}

pub fn write_outputs(artifact: &AtlasArtifact, cfg: &BuildConfig) -> Result<()> {
    for p in [&artifact.png_path, &artifact.fnt_path] {
        if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
    }
    artifact.image.save(&artifact.png_path).with_context(|| format!("write {}", artifact.png_path.display()))?;
    fs::write(&artifact.fnt_path, artifact.descriptor.render()).with_context(|| format!("write {}", artifact.fnt_path.display()))?;
    if cfg.stdout_json { println!("{}", serde_json::to_string_pretty(&artifact.descriptor)?); }
    info!(
        "wrote {} ({}x{}) and {} ({} chars)",
        artifact.png_path.display(), artifact.image.width(), artifact.image.height(),
        artifact.fnt_path.display(), artifact.descriptor.chars.len()
    );
    Ok(())
}

/// Parse a descriptor and check it against its page image. `atlas_png` defaults to the page file
/// next to the descriptor.
pub fn inspect(fnt_path: &Path, atlas_png: Option<&Path>) -> Result<Inspection> {
    let txt = fs::read_to_string(fnt_path).with_context(|| format!("read {}", fnt_path.display()))?;
    let desc = parse_descriptor(&txt).with_context(|| format!("parse {}", fnt_path.display()))?;
    let png = match atlas_png {
        Some(p) => p.to_path_buf(),
        None => fnt_path.parent().unwrap_or(Path::new("")).join(&desc.page_file),
    };
    let img = image::open(&png).with_context(|| format!("open page image {}", png.display()))?;
    let (w, h) = (img.width(), img.height());
    let out_of_bounds: Vec<u32> = desc.chars.iter()
        .filter(|c| c.right() > w as u64 || c.bottom() > h as u64)
        .map(|c| c.id)
        .collect();
    if (desc.scale_w, desc.scale_h) != (w, h) { warn!("scaleW/scaleH {}x{} but page is {w}x{h}", desc.scale_w, desc.scale_h); }
    if !out_of_bounds.is_empty() { warn!("{} char rects leave the page: {:?}", out_of_bounds.len(), out_of_bounds); }
    Ok(Inspection {
        face: desc.face,
        page_file: desc.page_file,
        char_count: desc.chars.len(),
        declared_dim: (desc.scale_w, desc.scale_h),
        atlas_dim: (w, h),
        out_of_bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_name_is_atlas_file_name() {
        assert_eq!(page_file_name(Path::new("out/fonts/hud.png")).unwrap(), "hud.png");
        assert!(page_file_name(Path::new("/")).is_err());
        assert!(page_file_name(Path::new("a\"b.png")).is_err());
    }

    #[test]
    fn rejects_bad_face_and_size() {
        let tmp = tempfile::tempdir().unwrap();
        let base = BuildConfig { src_dir: tmp.path().to_path_buf(), out_png: tmp.path().join("f.png"), out_fnt: tmp.path().join("f.fnt"), ..Default::default() };
        assert!(build_atlas(&BuildConfig { face: "a\"b".into(), ..base.clone() }).is_err());
        assert!(build_atlas(&BuildConfig { size: 0, ..base }).is_err());
    }
}
