//! BMFont text descriptor (`.fnt`): emit and parse.
//!
//! Emitted layout, one line each, in this order:
//!
//! ```text
//! info face="custom" size=64 padding=0,0,0,0 spacing=0,0
//! common lineHeight=H base=B scaleW=W scaleH=H pages=1 packed=0
//! page id=0 file="font.png"
//! chars count=N
//! char id=.. x=.. y=0 width=.. height=.. xoffset=0 yoffset=0 xadvance=.. page=0 chnl=15
//! ```
//!
//! The parser accepts what the emitter writes (single page, no kerning block).

use serde::Serialize;
use thiserror::Error;

/// Every channel of the page holds the glyph.
pub const ALL_CHANNELS: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlyphRecord {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub xoffset: i32,
    pub yoffset: i32,
    pub xadvance: u32,
    pub page: u32,
    pub chnl: u32,
}

impl GlyphRecord {
    /// Record for a glyph image at `(x, 0)`; advance equals its width.
    pub fn placed(id: u32, x: u32, width: u32, height: u32) -> Self {
        Self { id, x, y: 0, width, height, xoffset: 0, yoffset: 0, xadvance: width, page: 0, chnl: ALL_CHANNELS }
    }

    /// Zero-size space with a fixed advance.
    pub fn synthetic_space(advance: u32) -> Self {
        Self { xadvance: advance, ..Self::placed(' ' as u32, 0, 0, 0) }
    }

    pub fn right(&self) -> u64 { self.x as u64 + self.width as u64 }
    pub fn bottom(&self) -> u64 { self.y as u64 + self.height as u64 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FontDescriptor {
    pub face: String,
    pub size: u32,
    pub line_height: u32,
    pub base: u32,
    pub scale_w: u32,
    pub scale_h: u32,
    /// File name of the atlas page, relative to the descriptor.
    pub page_file: String,
    pub chars: Vec<GlyphRecord>,
}

/// Baseline sits at three quarters of the line height (rounded down).
pub fn baseline_for(line_height: u32) -> u32 { (line_height as u64 * 3 / 4) as u32 }

impl FontDescriptor {
    pub fn new(face: impl Into<String>, size: u32, atlas_dim: (u32, u32), page_file: impl Into<String>) -> Self {
        let (w, h) = atlas_dim;
        Self {
            face: face.into(),
            size,
            line_height: h,
            base: baseline_for(h),
            scale_w: w,
            scale_h: h,
            page_file: page_file.into(),
            chars: Vec::new(),
        }
    }

    pub fn push(&mut self, rec: GlyphRecord) { self.chars.push(rec); }

    pub fn get(&self, id: u32) -> Option<&GlyphRecord> { self.chars.iter().find(|c| c.id == id) }

    pub fn render(&self) -> String {
        let mut s = String::with_capacity(96 * (self.chars.len() + 4));
        s.push_str(&format!("info face=\"{}\" size={} padding=0,0,0,0 spacing=0,0\n", self.face, self.size));
        s.push_str(&format!(
            "common lineHeight={} base={} scaleW={} scaleH={} pages=1 packed=0\n",
            self.line_height, self.base, self.scale_w, self.scale_h
        ));
        s.push_str(&format!("page id=0 file=\"{}\"\n", self.page_file));
        s.push_str(&format!("chars count={}\n", self.chars.len()));
        for c in &self.chars {
            s.push_str(&format!(
                "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page={} chnl={}\n",
                c.id, c.x, c.y, c.width, c.height, c.xoffset, c.yoffset, c.xadvance, c.page, c.chnl
            ));
        }
        s
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("missing `{0}` line")]
    MissingLine(&'static str),
    #[error("line {line}: unknown tag `{tag}`")]
    UnknownTag { line: usize, tag: String },
    #[error("line {line}: unterminated quoted value")]
    UnterminatedQuote { line: usize },
    #[error("line {line}: missing field `{key}`")]
    MissingField { line: usize, key: &'static str },
    #[error("line {line}: bad value `{value}` for `{key}`")]
    BadValue { line: usize, key: &'static str, value: String },
    #[error("only single-page fonts are supported (pages={0})")]
    MultiPage(u32),
    #[error("chars count={declared} but {found} char lines")]
    CountMismatch { declared: usize, found: usize },
}

struct Line<'a> {
    no: usize,
    tag: &'a str,
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> Line<'a> {
    fn raw(&self, key: &'static str) -> Result<&'a str, DescriptorError> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, v)| *v).ok_or(DescriptorError::MissingField { line: self.no, key })
    }

    fn num<T: std::str::FromStr>(&self, key: &'static str) -> Result<T, DescriptorError> {
        let v = self.raw(key)?;
        v.parse().map_err(|_| DescriptorError::BadValue { line: self.no, key, value: v.to_string() })
    }
}

fn tokenize(no: usize, text: &str) -> Result<Line<'_>, DescriptorError> {
    let text = text.trim();
    let (tag, mut rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let mut fields = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() { break; }
        let Some(eq) = rest.find('=') else {
            // bare token without a value
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            fields.push((&rest[..end], ""));
            rest = &rest[end..];
            continue;
        };
        let key = &rest[..eq];
        let after = &rest[eq + 1..];
        if let Some(quoted) = after.strip_prefix('"') {
            let close = quoted.find('"').ok_or(DescriptorError::UnterminatedQuote { line: no })?;
            fields.push((key, &quoted[..close]));
            rest = &quoted[close + 1..];
        } else {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            fields.push((key, &after[..end]));
            rest = &after[end..];
        }
    }
    Ok(Line { no, tag, fields })
}

/// Parse a descriptor written by [`FontDescriptor::render`] (or any single-page BMFont text file
/// without kerning pairs).
pub fn parse_descriptor(text: &str) -> Result<FontDescriptor, DescriptorError> {
    let mut info = None;
    let mut common = None;
    let mut page_file = None;
    let mut declared = None;
    let mut chars = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() { continue; }
        let line = tokenize(i + 1, raw)?;
        match line.tag {
            "info" => info = Some((line.raw("face")?.to_string(), line.num::<u32>("size")?)),
            "common" => {
                let pages: u32 = line.num("pages")?;
                if pages != 1 { return Err(DescriptorError::MultiPage(pages)); }
                common = Some((line.num::<u32>("lineHeight")?, line.num::<u32>("base")?, line.num::<u32>("scaleW")?, line.num::<u32>("scaleH")?));
            }
            "page" => page_file = Some(line.raw("file")?.to_string()),
            "chars" => declared = Some(line.num::<usize>("count")?),
            "char" => chars.push(GlyphRecord {
                id: line.num("id")?,
                x: line.num("x")?,
                y: line.num("y")?,
                width: line.num("width")?,
                height: line.num("height")?,
                xoffset: line.num("xoffset")?,
                yoffset: line.num("yoffset")?,
                xadvance: line.num("xadvance")?,
                page: line.num("page")?,
                chnl: line.num("chnl")?,
            }),
            other => return Err(DescriptorError::UnknownTag { line: line.no, tag: other.to_string() }),
        }
    }

    let (face, size) = info.ok_or(DescriptorError::MissingLine("info"))?;
    let (line_height, base, scale_w, scale_h) = common.ok_or(DescriptorError::MissingLine("common"))?;
    let page_file = page_file.ok_or(DescriptorError::MissingLine("page"))?;
    let declared = declared.ok_or(DescriptorError::MissingLine("chars"))?;
    if declared != chars.len() { return Err(DescriptorError::CountMismatch { declared, found: chars.len() }); }
    Ok(FontDescriptor { face, size, line_height, base, scale_w, scale_h, page_file, chars })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FontDescriptor {
        let mut d = FontDescriptor::new("custom", 64, (6, 3), "font.png");
        d.push(GlyphRecord::placed(65, 0, 2, 3));
        d.push(GlyphRecord::placed(98, 2, 4, 3));
        d
    }

    #[test]
    fn renders_exact_text() {
        let expected = "info face=\"custom\" size=64 padding=0,0,0,0 spacing=0,0\n\
common lineHeight=3 base=2 scaleW=6 scaleH=3 pages=1 packed=0\n\
page id=0 file=\"font.png\"\n\
chars count=2\n\
char id=65 x=0 y=0 width=2 height=3 xoffset=0 yoffset=0 xadvance=2 page=0 chnl=15\n\
char id=98 x=2 y=0 width=4 height=3 xoffset=0 yoffset=0 xadvance=4 page=0 chnl=15\n";
        assert_eq!(sample().render(), expected);
    }

    #[test]
    fn baseline_rounds_down() {
        assert_eq!(baseline_for(3), 2);
        assert_eq!(baseline_for(64), 48);
        assert_eq!(baseline_for(10), 7);
        assert_eq!(baseline_for(0), 0);
    }

    #[test]
    fn synthetic_space_line() {
        let mut d = FontDescriptor::new("custom", 64, (1, 1), "a.png");
        d.push(GlyphRecord::synthetic_space(20));
        assert!(d.render().contains("char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=0 xadvance=20 page=0 chnl=15\n"));
    }

    #[test]
    fn parse_reads_back_render() {
        let d = sample();
        assert_eq!(parse_descriptor(&d.render()).unwrap(), d);
    }

    #[test]
    fn parse_quoted_face_with_spaces() {
        let mut d = FontDescriptor::new("Pixel Sans", 32, (2, 2), "my atlas.png");
        d.push(GlyphRecord::placed(49, 0, 2, 2));
        let back = parse_descriptor(&d.render()).unwrap();
        assert_eq!(back.face, "Pixel Sans");
        assert_eq!(back.page_file, "my atlas.png");
    }

    #[test]
    fn parse_count_mismatch() {
        let txt = sample().render().replace("chars count=2", "chars count=3");
        assert_eq!(parse_descriptor(&txt), Err(DescriptorError::CountMismatch { declared: 3, found: 2 }));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_descriptor("").unwrap_err(), DescriptorError::MissingLine("info"));
        let bad = sample().render().replace("x=2 ", "x=two ");
        assert!(matches!(parse_descriptor(&bad), Err(DescriptorError::BadValue { key: "x", .. })));
        let unknown = format!("{}kerning first=65 second=66 amount=-1\n", sample().render());
        assert!(matches!(parse_descriptor(&unknown), Err(DescriptorError::UnknownTag { .. })));
        let quote = sample().render().replace("file=\"font.png\"", "file=\"font.png");
        assert_eq!(parse_descriptor(&quote).unwrap_err(), DescriptorError::UnterminatedQuote { line: 3 });
    }
}
