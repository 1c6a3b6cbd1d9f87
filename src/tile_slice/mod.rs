//! Background tile slicer.
//!
//! Cuts an image into `tile`×`tile` pieces and gives every piece a random "crumbling" alpha mask:
//! uniform noise, gaussian blurred, then thresholded into a binary mask. Edge tiles are padded
//! with transparent pixels so every output tile has the same size.

use anyhow::{bail, Context, Result};
use image::{imageops, GrayImage, Luma, RgbaImage};
use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{fs, path::PathBuf};

#[derive(Clone, Debug)]
pub struct SliceConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub tile: u32,
    /// Mask threshold in 0..=1; higher keeps fewer pixels.
    pub strength: f32,
    /// Gaussian sigma applied to the noise; 0 disables blurring.
    pub blur: f32,
    pub seed: Option<u64>,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("decoration/menu_background.png"),
            out_dir: PathBuf::from("tiles"),
            tile: 64,
            strength: 0.5,
            blur: 2.5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileInfo {
    pub id: u32,
    pub x: u32,
    pub y: u32,
}

impl TileInfo {
    pub fn file_name(&self) -> String { format!("tile_{}_{}_{}.png", self.id, self.x, self.y) }
}

#[derive(Debug, Clone)]
pub struct WrittenTile {
    pub info: TileInfo,
    pub path: PathBuf,
}

fn check(cfg: &SliceConfig) -> Result<()> {
    if cfg.tile == 0 { bail!("tile size must be > 0"); }
    if !(0.0..=1.0).contains(&cfg.strength) { bail!("strength {} outside 0..=1", cfg.strength); }
    if !(cfg.blur >= 0.0 && cfg.blur.is_finite()) { bail!("blur {} must be a finite value >= 0", cfg.blur); }
    Ok(())
}

/// Binary (0/255) mask: blurred uniform noise compared against `strength`.
pub fn noise_mask<R: Rng>(size: u32, strength: f32, blur: f32, rng: &mut R) -> GrayImage {
    let noise = GrayImage::from_fn(size, size, |_, _| Luma([(rng.gen::<f32>() * 255.0) as u8]));
    let soft = if blur > 0.0 { imageops::blur(&noise, blur) } else { noise };
    GrayImage::from_fn(size, size, |x, y| {
        let p = soft.get_pixel(x, y)[0] as f32 / 255.0;
        Luma([if p > strength { 255 } else { 0 }])
    })
}

/// `tile`×`tile` copy of the region at (x, y); pixels past the source edge are transparent.
pub fn crop_padded(img: &RgbaImage, x: u32, y: u32, tile: u32) -> RgbaImage {
    let region = imageops::crop_imm(img, x, y, tile, tile).to_image();
    let mut out = RgbaImage::new(tile, tile);
    imageops::replace(&mut out, &region, 0, 0);
    out
}

/// Slice in memory, row-major from the top-left corner.
pub fn slice_image<R: Rng>(img: &RgbaImage, tile: u32, strength: f32, blur: f32, rng: &mut R) -> Vec<(TileInfo, RgbaImage)> {
    let (w, h) = img.dimensions();
    let mut out = Vec::new();
    let mut id = 0u32;
    for y in (0..h).step_by(tile as usize) {
        for x in (0..w).step_by(tile as usize) {
            let mut piece = crop_padded(img, x, y, tile);
            let mask = noise_mask(tile, strength, blur, rng);
            for (px, m) in piece.pixels_mut().zip(mask.pixels()) {
                px[3] = px[3].min(m[0]);
            }
            out.push((TileInfo { id, x, y }, piece));
            id += 1;
        }
    }
    out
}

pub fn slice_to_dir(cfg: &SliceConfig) -> Result<Vec<WrittenTile>> {
    check(cfg)?;
    let img = image::open(&cfg.input).with_context(|| format!("open {}", cfg.input.display()))?.to_rgba8();
    let mut rng = match cfg.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let pieces = slice_image(&img, cfg.tile, cfg.strength, cfg.blur, &mut rng);
    fs::create_dir_all(&cfg.out_dir).with_context(|| format!("create {}", cfg.out_dir.display()))?;
    let mut written = Vec::with_capacity(pieces.len());
    for (info, piece) in pieces {
        let path = cfg.out_dir.join(info.file_name());
        piece.save(&path).with_context(|| format!("write {}", path.display()))?;
        debug!("tile {} -> {}", info.id, path.display());
        written.push(WrittenTile { info, path });
    }
    info!("done: {} tiles from {} into {}", written.len(), cfg.input.display(), cfg.out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mask_is_binary() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = noise_mask(16, 0.5, 1.5, &mut rng);
        assert!(m.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn extreme_strengths() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(noise_mask(8, 1.0, 0.0, &mut rng).pixels().all(|p| p[0] == 0));
        // noise is truncated to u8 so a pixel can be exactly 0
        let low = noise_mask(8, 0.0, 0.0, &mut rng);
        assert!(low.pixels().filter(|p| p[0] == 255).count() > 32);
    }

    #[test]
    fn tile_grid_and_padding() {
        let img = RgbaImage::from_pixel(10, 5, Rgba([9, 9, 9, 255]));
        let mut rng = StdRng::seed_from_u64(3);
        let tiles = slice_image(&img, 4, 0.0, 0.0, &mut rng);
        let coords: Vec<(u32, u32, u32)> = tiles.iter().map(|(t, _)| (t.id, t.x, t.y)).collect();
        assert_eq!(coords, vec![(0, 0, 0), (1, 4, 0), (2, 8, 0), (3, 0, 4), (4, 4, 4), (5, 8, 4)]);
        assert!(tiles.iter().all(|(_, p)| p.dimensions() == (4, 4)));
        // columns 2..4 of the last tile lie outside the 10px wide source
        let (_, last) = &tiles[5];
        assert_eq!(last.get_pixel(3, 0)[3], 0);
        assert_eq!(last.get_pixel(0, 1)[3], 0);
    }

    #[test]
    fn seeded_runs_repeat() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let a = slice_image(&img, 4, 0.5, 1.0, &mut StdRng::seed_from_u64(42));
        let b = slice_image(&img, 4, 0.5, 1.0, &mut StdRng::seed_from_u64(42));
        for ((_, pa), (_, pb)) in a.iter().zip(&b) { assert_eq!(pa, pb); }
    }

    #[test]
    fn rejects_bad_params() {
        assert!(check(&SliceConfig { tile: 0, ..Default::default() }).is_err());
        assert!(check(&SliceConfig { strength: 1.5, ..Default::default() }).is_err());
        assert!(check(&SliceConfig { blur: -1.0, ..Default::default() }).is_err());
        assert!(check(&SliceConfig::default()).is_ok());
    }

    #[test]
    fn file_names() {
        assert_eq!(TileInfo { id: 3, x: 128, y: 64 }.file_name(), "tile_3_128_64.png");
    }
}
