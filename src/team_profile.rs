use crate::error::DataAccessError;
use crate::match_db::MatchDb;
use crate::result_table::ResultTable;

pub const TEAM_COLUMN: &str = "team";
pub const TOP_TEAMS: usize = 5;

/// One radar axis: a per-team home average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMetric {
    pub column: &'static str,
    pub label: &'static str,
}

pub const TEAM_METRICS: [TeamMetric; 6] = [
    TeamMetric { column: "avg_goals_scored", label: "Goals scored" },
    TeamMetric { column: "avg_goals_conceded", label: "Goals conceded" },
    TeamMetric { column: "avg_shots", label: "Shots" },
    TeamMetric { column: "avg_shots_on_target", label: "Shots on target" },
    TeamMetric { column: "avg_fouls", label: "Fouls" },
    TeamMetric { column: "avg_cards", label: "Cards" },
];

// Ties on goals scored fall back to team name so the top five are stable.
pub const TEAM_PROFILE_SQL: &str = r#"
    SELECT
        HomeTeam AS team,
        AVG(FullTimeHomeGoals) AS avg_goals_scored,
        AVG(FullTimeAwayGoals) AS avg_goals_conceded,
        AVG(HomeShots) AS avg_shots,
        AVG(HomeShotsOnTarget) AS avg_shots_on_target,
        AVG(HomeFouls) AS avg_fouls,
        AVG(HomeYellowCards + HomeRedCards) AS avg_cards
    FROM matches
    GROUP BY HomeTeam
    ORDER BY avg_goals_scored DESC, HomeTeam ASC
    LIMIT 5
"#;

/// Home-match profile of the five best-scoring home sides, every metric
/// min-max normalized across those five rows.
pub fn team_profile(db: &MatchDb) -> Result<ResultTable, DataAccessError> {
    const LABEL: &str = "team_profile";
    let mut table = db.query(LABEL, TEAM_PROFILE_SQL)?;
    for metric in &TEAM_METRICS {
        let raw = table
            .f64_column(metric.column)
            .map_err(|source| DataAccessError::Decode {
                label: LABEL,
                source,
            })?;
        table
            .set_f64_column(metric.column, min_max_normalize(&raw))
            .map_err(|source| DataAccessError::Decode {
                label: LABEL,
                source,
            })?;
    }
    Ok(table)
}

/// Scales `values` onto [0, 1]. A constant (or non-finite) range maps every
/// value to 0.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::min_max_normalize;

    #[test]
    fn normalize_maps_extremes_to_unit_interval() {
        let out = min_max_normalize(&[2.0, 4.0, 3.0]);
        assert_eq!(out, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn constant_metric_normalizes_to_zero() {
        assert_eq!(min_max_normalize(&[1.5, 1.5, 1.5]), vec![0.0, 0.0, 0.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }
}
