//! glyph_baker CLI
//!
//! Subcommands:
//!   font     Pack single-character glyph images into font.png + font.fnt (BMFont text)
//!   inspect  Check a .fnt descriptor against its atlas page
//!   slice    Cut a background into crumbling, alpha-masked tiles
//!   config   Print the effective configuration and its warnings
//!
//! Example:
//!   cargo run --bin glyph_baker -- font --src assets_raw/font --mapping fold-case
//!
//! Settings come from `glyph_baker.ron` (or every `--config` given, later files winning);
//! flags override them. Set RUST_LOG=debug to see skipped files.

use std::path::{Path, PathBuf};
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use glyph_baker::config::{BakerConfig, DEFAULT_CONFIG_PATH};
use glyph_baker::font_atlas::{build_atlas, inspect, write_outputs, CaseMapping};
use glyph_baker::tile_slice::slice_to_dir;

#[derive(Parser, Debug)]
#[command(author, version, about="2D art baking tools: bitmap-font atlas and tile slicer", long_about=None)]
struct Cli {
    /// RON config layer(s); defaults to ./glyph_baker.ron when present
    #[arg(long, global=true)] config: Vec<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a bitmap-font atlas (PNG + .fnt)
    Font(FontArgs),
    /// Verify a .fnt descriptor against its atlas image
    Inspect(InspectArgs),
    /// Slice an image into alpha-masked tiles
    Slice(SliceArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum MappingArg {
    /// One code point per glyph image
    Exact,
    /// Letters serve both cases; a synthetic space is added
    FoldCase,
}

#[derive(Args, Debug)]
struct FontArgs {
    /// Directory holding <char>.png glyph images
    #[arg(long)] src: Option<PathBuf>,
    #[arg(long)] out_png: Option<PathBuf>,
    #[arg(long)] out_fnt: Option<PathBuf>,
    #[arg(long, value_enum)] mapping: Option<MappingArg>,
    #[arg(long)] face: Option<String>,
    #[arg(long)] size: Option<u32>,
    /// Advance of the synthetic space (fold-case only)
    #[arg(long)] space_advance: Option<u32>,
    /// Fail instead of replacing existing font.png / font.fnt
    #[arg(long)] no_clobber: bool,
    /// Also print the descriptor as JSON
    #[arg(long)] stdout_json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[arg(long)] fnt: PathBuf,
    /// Atlas image; defaults to the page file next to the descriptor
    #[arg(long)] atlas_png: Option<PathBuf>,
    #[arg(long)] json: bool,
}

#[derive(Args, Debug)]
struct SliceArgs {
    #[arg(long)] input: Option<PathBuf>,
    #[arg(long)] out_dir: Option<PathBuf>,
    #[arg(long)] tile: Option<u32>,
    #[arg(long)] strength: Option<f32>,
    #[arg(long)] blur: Option<f32>,
    #[arg(long)] seed: Option<u64>,
}

fn load_config(paths: &[PathBuf]) -> BakerConfig {
    if paths.is_empty() {
        if !Path::new(DEFAULT_CONFIG_PATH).exists() { return BakerConfig::default(); }
        let (cfg, err) = BakerConfig::load_or_default(DEFAULT_CONFIG_PATH);
        match err {
            Some(e) => warn!("config: {e}; using defaults"),
            None => info!("config: {DEFAULT_CONFIG_PATH}"),
        }
        return cfg;
    }
    let (cfg, used, errors) = BakerConfig::load_layered(paths);
    for e in &errors { warn!("config: {e}"); }
    if !used.is_empty() { info!("config layers: {}", used.join(", ")); }
    cfg
}

fn cmd_font(a: FontArgs, cfg: &BakerConfig) -> Result<()> {
    let mut fc = cfg.font.clone();
    if let Some(v) = a.space_advance { fc.space_advance = v; }
    if let Some(m) = a.mapping { fc.fold_case = matches!(m, MappingArg::FoldCase); }
    let mut build = fc.to_build_config();
    if let Some(v) = a.src { build.src_dir = v; }
    if let Some(v) = a.out_png { build.out_png = v; }
    if let Some(v) = a.out_fnt { build.out_fnt = v; }
    if let Some(v) = a.face { build.face = v; }
    if let Some(v) = a.size { build.size = v; }
    build.no_clobber = a.no_clobber;
    build.stdout_json = a.stdout_json;

    let artifact = build_atlas(&build)?;
    write_outputs(&artifact, &build)?;
    let variant = match build.mapping { CaseMapping::Exact => "exact", CaseMapping::FoldCase { .. } => "fold-case" };
    println!("DONE: {} + {} ({} chars, {variant})", artifact.fnt_path.display(), artifact.png_path.display(), artifact.descriptor.chars.len());
    Ok(())
}

fn cmd_inspect(a: InspectArgs) -> Result<()> {
    let res = inspect(&a.fnt, a.atlas_png.as_deref())?;
    if a.json {
        println!("{}", serde_json::to_string_pretty(&res)?);
    } else {
        println!("Font: face={:?} page={} chars={} declared={}x{} atlas={}x{} out_of_bounds={}",
            res.face, res.page_file, res.char_count, res.declared_dim.0, res.declared_dim.1, res.atlas_dim.0, res.atlas_dim.1, res.out_of_bounds.len());
    }
    if !res.is_consistent() { bail!("descriptor {} does not match its atlas", a.fnt.display()); }
    Ok(())
}

fn cmd_slice(a: SliceArgs, cfg: &BakerConfig) -> Result<()> {
    let mut sc = cfg.tiles.to_slice_config();
    if let Some(v) = a.input { sc.input = v; }
    if let Some(v) = a.out_dir { sc.out_dir = v; }
    if let Some(v) = a.tile { sc.tile = v; }
    if let Some(v) = a.strength { sc.strength = v; }
    if let Some(v) = a.blur { sc.blur = v; }
    if a.seed.is_some() { sc.seed = a.seed; }
    let tiles = slice_to_dir(&sc)?;
    println!("done: {} pieces", tiles.len());
    Ok(())
}

fn cmd_config(cfg: &BakerConfig) -> Result<()> {
    let pretty = ron::ser::to_string_pretty(cfg, ron::ser::PrettyConfig::default())?;
    println!("{pretty}");
    for w in cfg.validate() { println!("warning: {w}"); }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let cfg = load_config(&cli.config);
    for w in cfg.validate() { warn!("config: {w}"); }
    match cli.command {
        Commands::Font(a) => cmd_font(a, &cfg),
        Commands::Inspect(a) => cmd_inspect(a),
        Commands::Slice(a) => cmd_slice(a, &cfg),
        Commands::Config => cmd_config(&cfg),
    }
}
