use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DataAccessError;
use crate::result_table::{ResultTable, Value};

pub const MATCHES_TABLE: &str = "matches";

/// One historical match as stored in the `matches` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub season: String,
    pub home_team: String,
    pub away_team: String,
    pub full_time_home_goals: u32,
    pub full_time_away_goals: u32,
    pub half_time_home_goals: u32,
    pub half_time_away_goals: u32,
    pub home_shots: u32,
    pub away_shots: u32,
    pub home_shots_on_target: u32,
    pub away_shots_on_target: u32,
    pub home_fouls: u32,
    pub away_fouls: u32,
    pub home_yellow_cards: u32,
    pub away_yellow_cards: u32,
    pub home_red_cards: u32,
    pub away_red_cards: u32,
}

impl MatchRecord {
    /// A match with only the scoreline filled in; every other count is zero.
    pub fn with_score(season: &str, home_team: &str, away_team: &str, home: u32, away: u32) -> Self {
        Self {
            season: season.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            full_time_home_goals: home,
            full_time_away_goals: away,
            half_time_home_goals: 0,
            half_time_away_goals: 0,
            home_shots: 0,
            away_shots: 0,
            home_shots_on_target: 0,
            away_shots_on_target: 0,
            home_fouls: 0,
            away_fouls: 0,
            home_yellow_cards: 0,
            away_yellow_cards: 0,
            home_red_cards: 0,
            away_red_cards: 0,
        }
    }

    pub fn total_goals(&self) -> u32 {
        self.full_time_home_goals + self.full_time_away_goals
    }
}

/// Read-only handle on the match database used by the report.
pub struct MatchDb {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for MatchDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchDb").field("path", &self.path).finish()
    }
}

impl MatchDb {
    pub fn open(path: &Path) -> Result<Self, DataAccessError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|source| {
            DataAccessError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_connection(conn, path.to_path_buf())
    }

    /// Wraps an existing connection, e.g. an in-memory database built by tests.
    pub fn from_connection(conn: Connection, path: PathBuf) -> Result<Self, DataAccessError> {
        let exists = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![MATCHES_TABLE],
                |row| row.get::<_, i64>(0),
            )
            .map_err(|source| DataAccessError::Open {
                path: path.clone(),
                source,
            })?;
        if exists == 0 {
            return Err(DataAccessError::MissingTable {
                path,
                table: MATCHES_TABLE,
            });
        }
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs one query and returns every row in query order.
    pub fn query(&self, label: &'static str, sql: &str) -> Result<ResultTable, DataAccessError> {
        let query_err = |source| DataAccessError::Query { label, source };

        let mut stmt = self.conn.prepare(sql).map_err(query_err)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>();
        let width = columns.len();
        let mut table = ResultTable::new(columns);

        let mut rows = stmt.query([]).map_err(query_err)?;
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value = match row.get_ref(idx).map_err(query_err)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Integer(n),
                    ValueRef::Real(x) => Value::Real(x),
                    ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                        Value::Text(String::from_utf8_lossy(bytes).into_owned())
                    }
                };
                values.push(value);
            }
            table.push_row(values);
        }

        debug!(label, rows = table.len(), "query complete");
        Ok(table)
    }
}

/// Opens (creating if needed) a writable database with the `matches` schema.
/// Used to build fixture and demo databases; the report itself never writes.
pub fn open_writable(path: &Path) -> Result<Connection, DataAccessError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DataAccessError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let conn = Connection::open(path).map_err(|source| DataAccessError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), DataAccessError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            Season TEXT NOT NULL,
            HomeTeam TEXT NOT NULL,
            AwayTeam TEXT NOT NULL,
            FullTimeHomeGoals INTEGER NOT NULL,
            FullTimeAwayGoals INTEGER NOT NULL,
            HalfTimeHomeGoals INTEGER NOT NULL,
            HalfTimeAwayGoals INTEGER NOT NULL,
            HomeShots INTEGER NOT NULL,
            AwayShots INTEGER NOT NULL,
            HomeShotsOnTarget INTEGER NOT NULL,
            AwayShotsOnTarget INTEGER NOT NULL,
            HomeFouls INTEGER NOT NULL,
            AwayFouls INTEGER NOT NULL,
            HomeYellowCards INTEGER NOT NULL,
            AwayYellowCards INTEGER NOT NULL,
            HomeRedCards INTEGER NOT NULL,
            AwayRedCards INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(Season);
        CREATE INDEX IF NOT EXISTS idx_matches_home_team ON matches(HomeTeam);
        "#,
    )
    .map_err(|source| DataAccessError::Query {
        label: "init_schema",
        source,
    })
}

pub fn insert_matches(conn: &mut Connection, rows: &[MatchRecord]) -> Result<usize, DataAccessError> {
    let insert_err = |source| DataAccessError::Query {
        label: "insert_matches",
        source,
    };
    let tx = conn.transaction().map_err(insert_err)?;
    {
        let mut stmt = tx
            .prepare(
                r#"
                INSERT INTO matches (
                    Season, HomeTeam, AwayTeam,
                    FullTimeHomeGoals, FullTimeAwayGoals,
                    HalfTimeHomeGoals, HalfTimeAwayGoals,
                    HomeShots, AwayShots, HomeShotsOnTarget, AwayShotsOnTarget,
                    HomeFouls, AwayFouls,
                    HomeYellowCards, AwayYellowCards, HomeRedCards, AwayRedCards
                ) VALUES (
                    ?1, ?2, ?3,
                    ?4, ?5,
                    ?6, ?7,
                    ?8, ?9, ?10, ?11,
                    ?12, ?13,
                    ?14, ?15, ?16, ?17
                )
                "#,
            )
            .map_err(insert_err)?;
        for m in rows {
            stmt.execute(params![
                m.season,
                m.home_team,
                m.away_team,
                m.full_time_home_goals,
                m.full_time_away_goals,
                m.half_time_home_goals,
                m.half_time_away_goals,
                m.home_shots,
                m.away_shots,
                m.home_shots_on_target,
                m.away_shots_on_target,
                m.home_fouls,
                m.away_fouls,
                m.home_yellow_cards,
                m.away_yellow_cards,
                m.home_red_cards,
                m.away_red_cards,
            ])
            .map_err(insert_err)?;
        }
    }
    tx.commit().map_err(insert_err)?;
    Ok(rows.len())
}

/// In-memory database holding `rows`, wrapped for querying.
pub fn in_memory(rows: &[MatchRecord]) -> Result<MatchDb, DataAccessError> {
    let mut conn = Connection::open_in_memory().map_err(|source| DataAccessError::Open {
        path: PathBuf::from(":memory:"),
        source,
    })?;
    init_schema(&conn)?;
    insert_matches(&mut conn, rows)?;
    MatchDb::from_connection(conn, PathBuf::from(":memory:"))
}
