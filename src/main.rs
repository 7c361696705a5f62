use anyhow::{Context, Result, bail};

use epl_report::config::ReportConfig;
use epl_report::match_db::MatchDb;
use epl_report::report;

fn main() -> Result<()> {
    let config = ReportConfig::from_env_and_args();
    config.logging.init();

    let db = MatchDb::open(config.db_path())
        .with_context(|| format!("unable to open match database {}", config.db_path().display()))?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("unable to create output dir {}", config.output_dir.display())
    })?;

    let summary = report::run_report(&db, &config).context("report aborted")?;

    println!("Report complete");
    println!("DB: {}", db.path().display());
    println!("Charts written: {}/{}", summary.written.len(), report::ReportTask::ALL.len());
    for (task, path) in &summary.written {
        println!("  {task}: {}", path.display());
    }
    if !summary.is_success() {
        println!("Failures: {}", summary.failures.len());
        for (task, err) in &summary.failures {
            println!("   - {task}: {err}");
        }
        bail!("{} chart(s) failed", summary.failures.len());
    }

    Ok(())
}
