use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;
pub const DEFAULT_MAX_KEY_CHARS: usize = 50;

#[derive(Parser, Debug)]
#[command(
    name = "circassian-dict",
    version,
    about = "Circassian dictionary normalization, rendering and packaging pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite raw sources that need a one-off cleanup before parsing.
    Repair(RepairArgs),
    /// Phase 01 -> 02: parse raw text files into canonical JSON.
    Parse(ParseArgs),
    /// Phase 02 -> 03: render canonical dictionaries to HTML.
    Render(RenderArgs),
    /// Phase 03 -> 04: merge HTML dictionaries into one index.
    Merge(MergeArgs),
    /// Phase 04 -> 05: load the merged index into SQLite.
    Load(LoadArgs),
    /// Run parse, render, merge and load in order.
    Build(BuildArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RepairArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long, default_value = "config/catalog.json")]
    pub catalog: PathBuf,

    #[arg(long = "source")]
    pub sources: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long, default_value = "config/catalog.json")]
    pub catalog: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    #[arg(long = "source")]
    pub sources: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_KEY_CHARS)]
    pub max_key_chars: usize,
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long, default_value = "config/catalog.json")]
    pub catalog: PathBuf,

    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    #[arg(long, default_value_t = DEFAULT_MAX_KEY_CHARS)]
    pub max_key_chars: usize,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "content")]
    pub content_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
