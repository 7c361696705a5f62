use std::path::{Path, PathBuf};

use crate::logging::LoggingConfig;
use crate::static_charts::RasterOptions;

pub const DEFAULT_DB_PATH: &str = "epl.db";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

const MIN_IMAGE_SIDE: u32 = 200;

/// Settings for one report run. Resolved as: argument, then environment,
/// then default.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub db_path: PathBuf,
    pub output_dir: PathBuf,
    pub raster: RasterOptions,
    pub logging: LoggingConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            raster: RasterOptions::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Loads `.env.local` / `.env` and resolves against the process arguments.
    pub fn from_env_and_args() -> Self {
        load_dotenv();
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let env_path = |key: &str| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        let env_side = |key: &str, fallback: u32| {
            env(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(fallback)
                .max(MIN_IMAGE_SIDE)
        };

        let db_path = parse_path_arg(args, "--db")
            .or_else(|| env_path("EPL_DB_PATH"))
            .unwrap_or(defaults.db_path);
        let output_dir = parse_path_arg(args, "--out")
            .or_else(|| env_path("EPL_OUTPUT_DIR"))
            .unwrap_or(defaults.output_dir);

        let raster = RasterOptions {
            width: env_side("EPL_IMAGE_WIDTH", defaults.raster.width),
            height: env_side("EPL_IMAGE_HEIGHT", defaults.raster.height),
            font_path: env_path("EPL_FONT_PATH"),
        };

        let mut logging = defaults.logging;
        if let Some(level) = env("EPL_LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            logging.level = level.trim().to_string();
        }
        if let Some(format) = env("EPL_LOG_FORMAT").filter(|v| !v.trim().is_empty()) {
            logging.format = format.trim().to_ascii_lowercase();
        }

        Self {
            db_path,
            output_dir,
            raster,
            logging,
        }
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Accepts both `--flag=value` and `--flag value`.
pub fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
