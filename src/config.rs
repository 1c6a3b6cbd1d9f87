//! Tool configuration: RON file(s) with per-field defaults. CLI flags override what is loaded here.

use crate::font_atlas::{BuildConfig, CaseMapping, DEFAULT_SPACE_ADVANCE};
use crate::tile_slice::SliceConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

pub const DEFAULT_CONFIG_PATH: &str = "glyph_baker.ron";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    pub src_dir: String,
    pub out_png: String,
    pub out_fnt: String,
    pub face: String,
    pub size: u32,
    /// Register alphabetic glyphs under both cases and emit a synthetic space.
    pub fold_case: bool,
    /// Advance of the synthetic space (only with `fold_case`).
    pub space_advance: u32,
}
impl Default for FontConfig {
    fn default() -> Self {
        Self {
            src_dir: "font".into(),
            out_png: "font.png".into(),
            out_fnt: "font.fnt".into(),
            face: "custom".into(),
            size: 64,
            fold_case: false,
            space_advance: DEFAULT_SPACE_ADVANCE,
        }
    }
}
impl FontConfig {
    pub fn mapping(&self) -> CaseMapping {
        if self.fold_case { CaseMapping::FoldCase { space_advance: self.space_advance } } else { CaseMapping::Exact }
    }

    pub fn to_build_config(&self) -> BuildConfig {
        BuildConfig {
            src_dir: PathBuf::from(&self.src_dir),
            out_png: PathBuf::from(&self.out_png),
            out_fnt: PathBuf::from(&self.out_fnt),
            face: self.face.clone(),
            size: self.size,
            mapping: self.mapping(),
            ..BuildConfig::default()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    pub input: String,
    pub out_dir: String,
    pub tile: u32,
    pub strength: f32,
    pub blur: f32,
    pub seed: Option<u64>,
}
impl Default for TileConfig {
    fn default() -> Self {
        Self {
            input: "decoration/menu_background.png".into(),
            out_dir: "tiles".into(),
            tile: 64,
            strength: 0.5,
            blur: 2.5,
            seed: None,
        }
    }
}
impl TileConfig {
    pub fn to_slice_config(&self) -> SliceConfig {
        SliceConfig {
            input: PathBuf::from(&self.input),
            out_dir: PathBuf::from(&self.out_dir),
            tile: self.tile,
            strength: self.strength,
            blur: self.blur,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct BakerConfig {
    pub font: FontConfig,
    pub tiles: TileConfig,
}

impl BakerConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.as_ref().display()))?;
        ron::from_str(&data).map_err(|e| format!("parse RON {}: {e}", path.as_ref().display()))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later files override earlier ones field by field.
    /// Returns (config, used_paths, errors); unreadable layers are reported and skipped.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let found = bm.iter_mut().find(|(ek, _)| **ek == k).map(|(_, ev)| ev);
                        match found {
                            Some(ev) => merge_value(ev, v),
                            None => {
                                bm.insert(k, v);
                            }
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        match &mut merged {
                            Some(cur) => merge_value(cur, val),
                            None => merged = Some(val),
                        }
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        match merged.map(|v| v.into_rust::<BakerConfig>()) {
            Some(Ok(cfg)) => (cfg, used, errors),
            Some(Err(e)) => {
                errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                (BakerConfig::default(), used, errors)
            }
            None => (BakerConfig::default(), used, errors),
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.font.face.is_empty() {
            w.push("font.face is empty".into());
        }
        if self.font.face.contains('"') {
            w.push("font.face contains '\"'; the descriptor cannot quote it".into());
        }
        if self.font.size == 0 {
            w.push("font.size must be > 0".into());
        }
        if self.font.fold_case && self.font.space_advance == 0 {
            w.push("font.space_advance is 0; the synthetic space would not advance".into());
        }
        if !self.font.fold_case && self.font.space_advance != DEFAULT_SPACE_ADVANCE {
            w.push("font.space_advance is ignored unless font.fold_case is true".into());
        }
        if !self.font.out_png.to_ascii_lowercase().ends_with(".png") {
            w.push(format!("font.out_png {:?} does not end in .png", self.font.out_png));
        }
        if self.tiles.tile == 0 {
            w.push("tiles.tile must be > 0".into());
        } else if self.tiles.tile < 8 {
            w.push(format!("tiles.tile {} very small; expect many files", self.tiles.tile));
        }
        if !(0.0..=1.0).contains(&self.tiles.strength) {
            w.push(format!("tiles.strength {} outside 0..1", self.tiles.strength));
        } else if self.tiles.strength > 0.9 {
            w.push(format!("tiles.strength {} keeps almost no pixels", self.tiles.strength));
        }
        if self.tiles.blur < 0.0 {
            w.push(format!("tiles.blur {} negative", self.tiles.blur));
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tmp");
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn defaults_match_legacy_tooling() {
        let cfg = BakerConfig::default();
        assert_eq!(cfg.font.out_png, "font.png");
        assert_eq!(cfg.font.out_fnt, "font.fnt");
        assert_eq!(cfg.font.face, "custom");
        assert_eq!(cfg.font.size, 64);
        assert_eq!(cfg.font.mapping(), CaseMapping::Exact);
        assert_eq!(cfg.tiles.tile, 64);
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = BakerConfig::load_from_file(write_temp(r#"(font: (face: "hud", fold_case: true))"#).path()).unwrap();
        assert_eq!(cfg.font.face, "hud");
        assert_eq!(cfg.font.mapping(), CaseMapping::FoldCase { space_advance: 20 });
        assert_eq!(cfg.font.size, 64);
        assert_eq!(cfg.tiles, TileConfig::default());
    }

    #[test]
    fn load_or_default_missing_file() {
        let (cfg, err) = BakerConfig::load_or_default("this/file/does/not/exist.ron");
        assert!(err.is_some());
        assert_eq!(cfg, BakerConfig::default());
    }

    #[test]
    fn layered_merge_overrides() {
        let base = write_temp(r#"(font: (face: "base", size: 32), tiles: (tile: 48))"#);
        let over = write_temp(r"(font: (size: 16), tiles: (seed: Some(9)))");
        let (cfg, used, errors) = BakerConfig::load_layered([base.path().to_path_buf(), over.path().to_path_buf()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.font.face, "base");
        assert_eq!(cfg.font.size, 16);
        assert_eq!(cfg.tiles.tile, 48);
        assert_eq!(cfg.tiles.seed, Some(9));
    }

    #[test]
    fn layered_reports_missing_layer() {
        let (cfg, used, errors) = BakerConfig::load_layered(["missing/one.ron"]);
        assert!(used.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(cfg, BakerConfig::default());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = BakerConfig::default();
        cfg.font.size = 0;
        cfg.font.fold_case = true;
        cfg.font.space_advance = 0;
        cfg.tiles.tile = 0;
        cfg.tiles.strength = 2.0;
        cfg.tiles.blur = -1.0;
        let joined = cfg.validate().join("\n");
        for needle in ["font.size", "font.space_advance", "tiles.tile", "tiles.strength", "tiles.blur"] {
            assert!(joined.contains(needle), "missing warning for {needle}: {joined}");
        }
    }

    #[test]
    fn bundled_sample_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config/glyph_baker.ron");
        let cfg = BakerConfig::load_from_file(path).expect("sample config");
        assert!(cfg.validate().is_empty(), "{:?}", cfg.validate());
    }
}
