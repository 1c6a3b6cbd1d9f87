//! Single-row glyph placement and code point mapping.

use super::descriptor::GlyphRecord;
use anyhow::{bail, Result};
use log::{debug, warn};
use std::collections::HashSet;

pub const SPACE: u32 = ' ' as u32;
pub const DEFAULT_SPACE_ADVANCE: u32 = 20;

/// How source characters map to descriptor code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseMapping {
    /// One record per glyph image, keyed by its own character.
    #[default]
    Exact,
    /// Alphabetic glyphs also serve their other-case code point, and a synthetic
    /// zero-size space record with a fixed advance is always emitted first.
    FoldCase { space_advance: u32 },
}

/// Where one glyph image lands in the atlas (always on row y = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into the glyph list handed to [`layout_glyphs`].
    pub source: usize,
    pub x: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasLayout {
    pub placements: Vec<Placement>,
    pub records: Vec<GlyphRecord>,
    pub width: u32,
    pub height: u32,
}

/// Code points registered for `ch`: its own first, then any single-scalar lower/upper forms.
pub fn case_codes(ch: char) -> Vec<u32> {
    let mut codes = vec![ch as u32];
    if !ch.is_alphabetic() { return codes; }
    for alt in [single(ch.to_lowercase()), single(ch.to_uppercase())].into_iter().flatten() {
        let code = alt as u32;
        if !codes.contains(&code) { codes.push(code); }
    }
    codes
}

fn single(mut it: impl Iterator<Item = char>) -> Option<char> {
    let c = it.next()?;
    if it.next().is_some() { None } else { Some(c) }
}

/// Pack glyphs left to right in the given order. `glyphs` holds each source character and its
/// pixel size `(width, height)`.
pub fn layout_glyphs(glyphs: &[(char, (u32, u32))], mapping: CaseMapping) -> Result<AtlasLayout> {
    let fold = matches!(mapping, CaseMapping::FoldCase { .. });
    let mut placements = Vec::with_capacity(glyphs.len());
    let mut records = Vec::new();
    let mut cursor = 0u32;
    let mut max_h = 0u32;

    if let CaseMapping::FoldCase { space_advance } = mapping {
        if space_advance == 0 { bail!("space advance must be > 0"); }
        records.push(GlyphRecord::synthetic_space(space_advance));
    }

    let own: HashSet<u32> = glyphs.iter().map(|(c, _)| *c as u32).collect();
    let mut taken: HashSet<u32> = records.iter().map(|r| r.id).collect();

    for (source, &(ch, (w, h))) in glyphs.iter().enumerate() {
        if fold && ch as u32 == SPACE {
            warn!("ignoring space glyph image; the synthetic space record is used instead");
            continue;
        }
        let x = cursor;
        placements.push(Placement { source, x, width: w, height: h });
        let codes = if fold { case_codes(ch) } else { vec![ch as u32] };
        for (i, code) in codes.into_iter().enumerate() {
            // aliases never shadow a code point that has its own glyph image
            if i > 0 && own.contains(&code) { debug!("'{ch}': alias {code} has its own glyph, skipped"); continue; }
            if !taken.insert(code) { warn!("duplicate code point {code} from '{ch}' skipped"); continue; }
            records.push(GlyphRecord::placed(code, x, w, h));
        }
        cursor = match cursor.checked_add(w) { Some(c) => c, None => bail!("atlas width overflows u32") };
        max_h = max_h.max(h);
    }

    if placements.is_empty() { bail!("no qualifying glyph images to pack"); }
    Ok(AtlasLayout { placements, records, width: cursor, height: max_h })
}
