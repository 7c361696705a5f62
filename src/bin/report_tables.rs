use anyhow::{Context, Result};
use serde_json::json;

use epl_report::config::ReportConfig;
use epl_report::error::DataAccessError;
use epl_report::match_db::MatchDb;
use epl_report::result_table::ResultTable;
use epl_report::{season_stats, team_profile};

type QueryFn = fn(&MatchDb) -> Result<ResultTable, DataAccessError>;

const QUERIES: [(&str, QueryFn); 7] = [
    ("season_goals", season_stats::season_goals),
    ("goal_distribution", season_stats::goal_distribution),
    ("high_scoring_rate", season_stats::high_scoring_rate),
    ("goal_heatmap", season_stats::goal_heatmap),
    ("team_profile", team_profile::team_profile),
    ("season_trend", season_stats::season_trend),
    ("goals_and_shots", season_stats::goals_and_shots),
];

fn main() -> Result<()> {
    let config = ReportConfig::from_env_and_args();
    config.logging.init();

    let db = MatchDb::open(config.db_path())
        .with_context(|| format!("unable to open match database {}", config.db_path().display()))?;

    let mut out = serde_json::Map::new();
    for (name, query) in QUERIES {
        let table = query(&db)?;
        out.insert(
            name.to_string(),
            json!({
                "columns": table.columns(),
                "rows": table.to_json_records(),
            }),
        );
    }

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
