use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::DataAccessError;
use crate::match_db::{self, MatchRecord};

pub const DEFAULT_SEED: u64 = 20_240_801;
/// Kept apart from the report's default `epl.db` so seeding never clobbers real data.
pub const DEFAULT_SAMPLE_DB_PATH: &str = "epl_sample.db";

const TEAMS: [&str; 20] = [
    "Arsenal",
    "Aston Villa",
    "Bournemouth",
    "Brentford",
    "Brighton",
    "Burnley",
    "Chelsea",
    "Crystal Palace",
    "Everton",
    "Fulham",
    "Leeds",
    "Leicester",
    "Liverpool",
    "Man City",
    "Man United",
    "Newcastle",
    "Southampton",
    "Tottenham",
    "West Ham",
    "Wolves",
];

// Mean goals per side; the home side gets a small bump.
const HOME_GOAL_RATE: f64 = 1.55;
const AWAY_GOAL_RATE: f64 = 1.20;
const FIRST_HALF_SHARE: f64 = 0.45;

#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub first_season: u16,
    pub seasons: usize,
    pub teams: usize,
    pub seed: u64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            first_season: 2014,
            seasons: 10,
            teams: TEAMS.len(),
            seed: DEFAULT_SEED,
        }
    }
}

/// `2020` -> `"2020-2021"`.
pub fn season_label(start_year: u16) -> String {
    format!("{start_year}-{}", start_year + 1)
}

/// Double round-robin seasons with plausible box-score numbers. Same options,
/// same rows.
pub fn generate_matches(opts: &SampleOptions) -> Vec<MatchRecord> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let teams = &TEAMS[..opts.teams.clamp(2, TEAMS.len())];
    let mut out = Vec::with_capacity(opts.seasons * teams.len() * (teams.len() - 1));

    for offset in 0..opts.seasons {
        let season = season_label(opts.first_season + offset as u16);
        // Drift scoring a little from season to season so the trend lines move.
        let drift = rng.gen_range(-0.15..0.15);
        for home in teams {
            for away in teams {
                if home == away {
                    continue;
                }
                out.push(sample_match(&mut rng, &season, home, away, drift));
            }
        }
    }
    out
}

fn sample_match(rng: &mut impl Rng, season: &str, home: &str, away: &str, drift: f64) -> MatchRecord {
    let full_home = poisson(rng, HOME_GOAL_RATE + drift);
    let full_away = poisson(rng, AWAY_GOAL_RATE + drift);
    let half_home = binomial(rng, full_home, FIRST_HALF_SHARE);
    let half_away = binomial(rng, full_away, FIRST_HALF_SHARE);

    let home_shots = rng.gen_range(6..22).max(full_home);
    let away_shots = rng.gen_range(4..18).max(full_away);
    let home_on_target = rng.gen_range(full_home..=home_shots.max(full_home));
    let away_on_target = rng.gen_range(full_away..=away_shots.max(full_away));

    MatchRecord {
        season: season.to_string(),
        home_team: home.to_string(),
        away_team: away.to_string(),
        full_time_home_goals: full_home,
        full_time_away_goals: full_away,
        half_time_home_goals: half_home,
        half_time_away_goals: half_away,
        home_shots,
        away_shots,
        home_shots_on_target: home_on_target.min(home_shots),
        away_shots_on_target: away_on_target.min(away_shots),
        home_fouls: rng.gen_range(5..18),
        away_fouls: rng.gen_range(5..18),
        home_yellow_cards: rng.gen_range(0..5),
        away_yellow_cards: rng.gen_range(0..6),
        home_red_cards: u32::from(rng.gen_bool(0.04)),
        away_red_cards: u32::from(rng.gen_bool(0.05)),
    }
}

fn poisson(rng: &mut impl Rng, lambda: f64) -> u32 {
    let limit = (-lambda.max(0.05)).exp();
    let mut k = 0;
    let mut p = 1.0;
    loop {
        p *= rng.r#gen::<f64>();
        if p <= limit || k >= 12 {
            return k;
        }
        k += 1;
    }
}

/// Writes a fresh synthetic database at `path` and returns the row count.
/// An existing file is left untouched unless `overwrite` is set.
pub fn write_sample_db(path: &Path, opts: &SampleOptions, overwrite: bool) -> Result<usize, DataAccessError> {
    if path.exists() {
        if !overwrite {
            return Err(DataAccessError::Exists {
                path: path.to_path_buf(),
            });
        }
        std::fs::remove_file(path).map_err(|source| DataAccessError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
        info!(db = %path.display(), "replacing existing db");
    }
    let mut conn = match_db::open_writable(path)?;
    let rows = generate_matches(opts);
    match_db::insert_matches(&mut conn, &rows)
}

fn binomial(rng: &mut impl Rng, trials: u32, p: f64) -> u32 {
    (0..trials).filter(|_| rng.gen_bool(p)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::{SampleOptions, generate_matches, season_label, write_sample_db};
    use crate::error::DataAccessError;
    use crate::match_db::MatchDb;

    #[test]
    fn generator_is_deterministic_per_seed() {
        let opts = SampleOptions {
            seasons: 2,
            teams: 6,
            ..SampleOptions::default()
        };
        let a = generate_matches(&opts);
        let b = generate_matches(&opts);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2 * 6 * 5);
    }

    #[test]
    fn generated_rows_are_consistent() {
        let rows = generate_matches(&SampleOptions {
            seasons: 3,
            teams: 8,
            ..SampleOptions::default()
        });
        for m in &rows {
            assert!(m.half_time_home_goals <= m.full_time_home_goals);
            assert!(m.half_time_away_goals <= m.full_time_away_goals);
            assert!(m.home_shots_on_target <= m.home_shots);
            assert!(m.away_shots_on_target <= m.away_shots);
            assert_ne!(m.home_team, m.away_team);
        }
        assert_eq!(rows[0].season, season_label(2014));
        assert_eq!(rows.last().map(|m| m.season.as_str()), Some("2016-2017"));
    }

    #[test]
    fn existing_db_is_kept_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epl.db");
        std::fs::write(&path, b"real data").unwrap();
        let opts = SampleOptions {
            seasons: 1,
            teams: 4,
            ..SampleOptions::default()
        };

        let err = write_sample_db(&path, &opts, false).unwrap_err();
        assert!(matches!(err, DataAccessError::Exists { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"real data");

        let inserted = write_sample_db(&path, &opts, true).unwrap();
        assert_eq!(inserted, 4 * 3);
        let db = MatchDb::open(&path).unwrap();
        let table = db.query("count", "SELECT COUNT(*) AS n FROM matches").unwrap();
        assert_eq!(table.len(), 1);
    }
}
