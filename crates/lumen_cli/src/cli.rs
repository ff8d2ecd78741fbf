use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Render the built-in demo scene and write a PNG
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Wavefront path tracer demo driver")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "320")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "240")]
    pub height: u32,

    /// Number of iterations (one sample per pixel each)
    #[arg(short, long, default_value = "64")]
    pub iterations: u32,

    /// Maximum bounces per path
    #[arg(short, long, default_value = "8")]
    pub depth: u32,

    /// Output PNG path
    #[arg(short, long, default_value = "lumen.png")]
    pub output: PathBuf,

    /// JSON render config; command-line switches override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scan every geom instead of traversing the BVH
    #[arg(long)]
    pub no_bvh: bool,

    /// Group paths by material before shading
    #[arg(long)]
    pub sort: bool,

    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}
