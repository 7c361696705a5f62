use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::ReportConfig;
use crate::error::{DataAccessError, RenderError, ReportError};
use crate::html_charts;
use crate::match_db::MatchDb;
use crate::result_table::ResultTable;
use crate::season_stats;
use crate::static_charts;
use crate::team_profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Png,
    Html,
}

/// One chart of the report. Each task owns its query, its reshape and its
/// output file; tasks share nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportTask {
    GoalsPerSeason,
    HomeAwayGoals,
    HalfTimeGoals,
    GoalsDistribution,
    HighScoringMatches,
    GoalsHeatmap,
    TeamRadar,
    GoalsAnimation,
    GoalsShots3d,
}

impl ReportTask {
    pub const ALL: [ReportTask; 9] = [
        ReportTask::GoalsPerSeason,
        ReportTask::HomeAwayGoals,
        ReportTask::HalfTimeGoals,
        ReportTask::GoalsDistribution,
        ReportTask::HighScoringMatches,
        ReportTask::GoalsHeatmap,
        ReportTask::TeamRadar,
        ReportTask::GoalsAnimation,
        ReportTask::GoalsShots3d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportTask::GoalsPerSeason => static_charts::GOALS_PER_SEASON.name,
            ReportTask::HomeAwayGoals => static_charts::HOME_AWAY_GOALS.name,
            ReportTask::HalfTimeGoals => static_charts::HALF_TIME_GOALS.name,
            ReportTask::GoalsDistribution => static_charts::GOALS_DISTRIBUTION.name,
            ReportTask::HighScoringMatches => static_charts::HIGH_SCORING_MATCHES.name,
            ReportTask::GoalsHeatmap => static_charts::GOALS_HEATMAP.name,
            ReportTask::TeamRadar => html_charts::TEAM_RADAR,
            ReportTask::GoalsAnimation => html_charts::GOALS_ANIMATION,
            ReportTask::GoalsShots3d => html_charts::GOALS_SHOTS_3D,
        }
    }

    pub fn kind(self) -> ArtifactKind {
        match self {
            ReportTask::TeamRadar | ReportTask::GoalsAnimation | ReportTask::GoalsShots3d => {
                ArtifactKind::Html
            }
            _ => ArtifactKind::Png,
        }
    }

    pub fn file_name(self) -> String {
        let ext = match self.kind() {
            ArtifactKind::Png => "png",
            ArtifactKind::Html => "html",
        };
        format!("{}.{ext}", self.name())
    }

    /// Runs the aggregation query this chart is drawn from.
    pub fn load(self, db: &MatchDb) -> Result<ResultTable, DataAccessError> {
        match self {
            ReportTask::GoalsPerSeason | ReportTask::HomeAwayGoals | ReportTask::HalfTimeGoals => {
                season_stats::season_goals(db)
            }
            ReportTask::GoalsDistribution => season_stats::goal_distribution(db),
            ReportTask::HighScoringMatches => season_stats::high_scoring_rate(db),
            ReportTask::GoalsHeatmap => season_stats::goal_heatmap(db),
            ReportTask::TeamRadar => team_profile::team_profile(db),
            ReportTask::GoalsAnimation => season_stats::season_trend(db),
            ReportTask::GoalsShots3d => season_stats::goals_and_shots(db),
        }
    }

    /// Draws `table` to `config`'s output directory and returns the written path.
    pub fn render(self, table: &ResultTable, config: &ReportConfig) -> Result<PathBuf, RenderError> {
        let path = config.artifact_path(&self.file_name());
        let raster = &config.raster;
        match self {
            ReportTask::GoalsPerSeason => {
                static_charts::render_line_area(&static_charts::GOALS_PER_SEASON, table, &path, raster)?
            }
            ReportTask::HomeAwayGoals => {
                static_charts::render_line_area(&static_charts::HOME_AWAY_GOALS, table, &path, raster)?
            }
            ReportTask::HalfTimeGoals => {
                static_charts::render_line_area(&static_charts::HALF_TIME_GOALS, table, &path, raster)?
            }
            ReportTask::HighScoringMatches => {
                static_charts::render_line_area(&static_charts::HIGH_SCORING_MATCHES, table, &path, raster)?
            }
            ReportTask::GoalsDistribution => static_charts::render_stacked_bars(
                &static_charts::GOALS_DISTRIBUTION,
                table,
                &path,
                raster,
            )?,
            ReportTask::GoalsHeatmap => {
                static_charts::render_heatmap(&static_charts::GOALS_HEATMAP, table, &path, raster)?
            }
            ReportTask::TeamRadar => html_charts::render_team_radar(table, &path)?,
            ReportTask::GoalsAnimation => html_charts::render_goals_animation(table, &path)?,
            ReportTask::GoalsShots3d => html_charts::render_goals_shots_3d(table, &path)?,
        }
        Ok(path)
    }
}

impl fmt::Display for ReportTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Query, reshape and render one task.
pub fn run_task(
    db: &MatchDb,
    task: ReportTask,
    config: &ReportConfig,
) -> Result<PathBuf, ReportError> {
    debug!(task = %task, "running report task");
    let started = Instant::now();
    let table = task.load(db)?;
    let path = task.render(&table, config)?;
    info!(
        task = %task,
        rows = table.len(),
        path = %path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote chart"
    );
    Ok(path)
}

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub written: Vec<(ReportTask, PathBuf)>,
    pub failures: Vec<(ReportTask, RenderError)>,
}

impl ReportSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs every task in order. A render failure is recorded and the run goes on;
/// a data access failure stops the run.
pub fn run_report(db: &MatchDb, config: &ReportConfig) -> Result<ReportSummary, DataAccessError> {
    run_tasks(db, &ReportTask::ALL, config)
}

pub fn run_tasks(
    db: &MatchDb,
    tasks: &[ReportTask],
    config: &ReportConfig,
) -> Result<ReportSummary, DataAccessError> {
    let mut summary = ReportSummary::default();
    for &task in tasks {
        match run_task(db, task, config) {
            Ok(path) => summary.written.push((task, path)),
            Err(ReportError::Render(err)) => {
                error!(task = %task, chart = err.chart(), error = %err, "chart failed");
                summary.failures.push((task, err));
            }
            Err(ReportError::DataAccess(err)) => {
                error!(task = %task, error = %err, "query failed; aborting report");
                return Err(err);
            }
        }
    }
    Ok(summary)
}
