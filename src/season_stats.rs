//! Per-season aggregation queries.
//!
//! Grouping and averaging happen in SQLite; percentage splits and the season
//! index are derived from the query result afterwards.

use crate::error::{ColumnError, DataAccessError};
use crate::match_db::MatchDb;
use crate::result_table::ResultTable;

pub const SEASON_COLUMN: &str = "season";

/// A goal-count category used by the percentage charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalBucket {
    pub column: &'static str,
    pub label: &'static str,
}

/// Five-way split used by the stacked bar chart: 0, 1, 2, 3, 4+.
pub const DISTRIBUTION_BUCKETS: [GoalBucket; 5] = [
    GoalBucket { column: "zero_goals", label: "0 goals" },
    GoalBucket { column: "one_goal", label: "1 goal" },
    GoalBucket { column: "two_goals", label: "2 goals" },
    GoalBucket { column: "three_goals", label: "3 goals" },
    GoalBucket { column: "four_plus_goals", label: "4+ goals" },
];

/// Six-way split used by the heatmap: 0, 1, 2, 3, 4, 5+.
pub const HEATMAP_BUCKETS: [GoalBucket; 6] = [
    GoalBucket { column: "zero_goals", label: "0" },
    GoalBucket { column: "one_goal", label: "1" },
    GoalBucket { column: "two_goals", label: "2" },
    GoalBucket { column: "three_goals", label: "3" },
    GoalBucket { column: "four_goals", label: "4" },
    GoalBucket { column: "five_plus_goals", label: "5+" },
];

pub const SEASON_GOALS_SQL: &str = r#"
    SELECT
        Season AS season,
        AVG(FullTimeHomeGoals + FullTimeAwayGoals) AS avg_goals_per_match,
        AVG(FullTimeHomeGoals) AS avg_home_goals,
        AVG(FullTimeAwayGoals) AS avg_away_goals,
        AVG(HalfTimeHomeGoals + HalfTimeAwayGoals) AS avg_first_half_goals,
        AVG((FullTimeHomeGoals + FullTimeAwayGoals) - (HalfTimeHomeGoals + HalfTimeAwayGoals)) AS avg_second_half_goals
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const GOAL_DISTRIBUTION_SQL: &str = r#"
    SELECT
        Season AS season,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) = 0 THEN 1 ELSE 0 END) AS zero_goals,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) = 1 THEN 1 ELSE 0 END) AS one_goal,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) = 2 THEN 1 ELSE 0 END) AS two_goals,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) = 3 THEN 1 ELSE 0 END) AS three_goals,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) >= 4 THEN 1 ELSE 0 END) AS four_plus_goals,
        COUNT(*) AS total_matches
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const HIGH_SCORING_SQL: &str = r#"
    SELECT
        Season AS season,
        SUM(CASE WHEN (FullTimeHomeGoals + FullTimeAwayGoals) >= 4 THEN 1 ELSE 0 END) * 100.0 / COUNT(*) AS high_scoring_percentage
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const GOAL_HEATMAP_SQL: &str = r#"
    SELECT
        Season AS season,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals = 0 THEN 1 ELSE 0 END) AS zero_goals,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals = 1 THEN 1 ELSE 0 END) AS one_goal,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals = 2 THEN 1 ELSE 0 END) AS two_goals,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals = 3 THEN 1 ELSE 0 END) AS three_goals,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals = 4 THEN 1 ELSE 0 END) AS four_goals,
        SUM(CASE WHEN FullTimeHomeGoals + FullTimeAwayGoals >= 5 THEN 1 ELSE 0 END) AS five_plus_goals
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const SEASON_TREND_SQL: &str = r#"
    SELECT
        Season AS season,
        AVG(FullTimeHomeGoals + FullTimeAwayGoals) AS avg_goals,
        AVG(FullTimeHomeGoals) AS avg_home_goals,
        AVG(FullTimeAwayGoals) AS avg_away_goals
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const GOALS_AND_SHOTS_SQL: &str = r#"
    SELECT
        Season AS season,
        AVG(FullTimeHomeGoals + FullTimeAwayGoals) AS avg_goals,
        AVG(HomeShots + AwayShots) AS avg_shots
    FROM matches
    GROUP BY Season
    ORDER BY Season
"#;

pub const SEASON_INDEX_COLUMN: &str = "season_num";

/// Averages of total, home, away, first-half and second-half goals per season.
pub fn season_goals(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    db.query("season_goals", SEASON_GOALS_SQL)
}

/// Share of matches per season in each of [`DISTRIBUTION_BUCKETS`], in percent.
pub fn goal_distribution(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    const LABEL: &str = "goal_distribution";
    let mut table = db.query(LABEL, GOAL_DISTRIBUTION_SQL)?;
    let decode = |source| DataAccessError::Decode {
        label: LABEL,
        source,
    };
    let totals = table.f64_column("total_matches").map_err(decode)?;
    to_percentages(&mut table, &DISTRIBUTION_BUCKETS, &totals).map_err(decode)?;
    Ok(table)
}

/// Percentage of matches per season with four or more goals.
pub fn high_scoring_rate(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    db.query("high_scoring_rate", HIGH_SCORING_SQL)
}

/// Share of matches per season in each of [`HEATMAP_BUCKETS`], in percent of
/// the row's bucket sum.
pub fn goal_heatmap(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    const LABEL: &str = "goal_heatmap";
    let mut table = db.query(LABEL, GOAL_HEATMAP_SQL)?;
    let decode = |source| DataAccessError::Decode {
        label: LABEL,
        source,
    };
    let mut totals = vec![0.0; table.len()];
    for bucket in &HEATMAP_BUCKETS {
        let counts = table.f64_column(bucket.column).map_err(decode)?;
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
    }
    to_percentages(&mut table, &HEATMAP_BUCKETS, &totals).map_err(decode)?;
    Ok(table)
}

/// Average total, home and away goals per season.
pub fn season_trend(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    db.query("season_trend", SEASON_TREND_SQL)
}

/// Average goals and shots per season plus a 0-based season index.
pub fn goals_and_shots(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    const LABEL: &str = "goals_and_shots";
    let mut table = db.query(LABEL, GOALS_AND_SHOTS_SQL)?;
    let index = (0..table.len()).map(|i| i as f64).collect::<Vec<_>>();
    table
        .set_f64_column(SEASON_INDEX_COLUMN, index)
        .map_err(|source| DataAccessError::Decode {
            label: LABEL,
            source,
        })?;
    Ok(table)
}

fn to_percentages(
    table: &mut ResultTable,
    buckets: &[GoalBucket],
    totals: &[f64],
) -> Result<(), ColumnError> {
    for bucket in buckets {
        let counts = table.f64_column(bucket.column)?;
        let pct = counts
            .iter()
            .zip(totals)
            .map(|(count, total)| percentage(*count, *total))
            .collect::<Vec<_>>();
        table.set_f64_column(bucket.column, pct)?;
    }
    Ok(())
}

fn percentage(count: f64, total: f64) -> f64 {
    if total > 0.0 { count / total * 100.0 } else { 0.0 }
}
