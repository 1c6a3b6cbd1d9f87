use super::layout::AtlasLayout;
use anyhow::{bail, Result};
use image::{imageops, Rgba, RgbaImage};

/// Paste every placed glyph onto a transparent surface of the layout's size. Pixels are copied
/// as-is (no blending); rows below shorter glyphs stay fully transparent.
pub fn compose_atlas(glyphs: &[RgbaImage], layout: &AtlasLayout) -> Result<RgbaImage> {
    let mut atlas = RgbaImage::from_pixel(layout.width, layout.height, Rgba([0, 0, 0, 0]));
    for p in &layout.placements {
        let Some(img) = glyphs.get(p.source) else { bail!("placement refers to missing glyph #{}", p.source) };
        if img.dimensions() != (p.width, p.height) {
            bail!("glyph #{} is {:?} but was laid out as {}x{}", p.source, img.dimensions(), p.width, p.height);
        }
        imageops::replace(&mut atlas, img, p.x as i64, 0);
    }
    Ok(atlas)
}
