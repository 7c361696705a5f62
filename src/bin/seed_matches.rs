use std::path::PathBuf;

use anyhow::{Context, Result};

use epl_report::config;
use epl_report::sample_data::{self, DEFAULT_SAMPLE_DB_PATH, SampleOptions};

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let db_path = config::parse_path_arg(&args, "--db")
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE_DB_PATH));
    let force = args.iter().any(|arg| arg == "--force");
    let defaults = SampleOptions::default();
    let opts = SampleOptions {
        seasons: parse_number_arg(&args, "--seasons").unwrap_or(defaults.seasons),
        seed: parse_number_arg(&args, "--seed").unwrap_or(defaults.seed),
        ..defaults
    };

    let inserted = sample_data::write_sample_db(&db_path, &opts, force)
        .with_context(|| format!("unable to seed {}", db_path.display()))?;

    println!("Synthetic matches written");
    println!("DB: {}", db_path.display());
    println!("Seasons: {} from {}", opts.seasons, sample_data::season_label(opts.first_season));
    println!("Matches: {inserted}");
    println!("Seed: {}", opts.seed);
    Ok(())
}

fn parse_number_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            return raw.trim().parse().ok();
        }
        if arg == flag {
            return args.get(idx + 1).and_then(|raw| raw.trim().parse().ok());
        }
    }
    None
}
