use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// Render a JSON scene to a PPM image.
#[derive(Debug, Parser)]
#[command(name = "lux", version)]
pub struct Args {
    /// Scene description (JSON)
    pub scene: PathBuf,

    /// Output image; standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Samples per pixel, overriding camera.samples
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Worker threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Sampling seed, overriding the scene's
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level; RUST_LOG still takes precedence
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["lux", "scene.json"]).unwrap();
        assert_eq!(args.scene, PathBuf::from("scene.json"));
        assert!(args.output.is_none());
        assert!(args.samples.is_none());
        assert_eq!(args.threads, 0);
        assert!(matches!(args.log_level, LogLevel::Info));
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "lux", "scene.json", "-o", "out.ppm", "--samples", "64", "--threads", "2", "--seed",
            "7", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.ppm")));
        assert_eq!(args.samples, Some(64));
        assert_eq!(args.threads, 2);
        assert_eq!(args.seed, Some(7));
        assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
    }

    #[test]
    fn test_scene_is_required() {
        assert!(Args::try_parse_from(["lux"]).is_err());
    }
}
