use std::path::PathBuf;

use rusqlite::Connection;

use epl_report::config::ReportConfig;
use epl_report::error::{DataAccessError, RenderError};
use epl_report::match_db::{MatchDb, in_memory};
use epl_report::report::{self, ReportTask};
use epl_report::result_table::{ResultTable, Value};
use epl_report::sample_data::{SampleOptions, generate_matches};
use epl_report::static_charts::{self, GOALS_DISTRIBUTION, GOALS_HEATMAP, HOME_AWAY_GOALS};

const HTML_TASKS: [ReportTask; 3] = [
    ReportTask::TeamRadar,
    ReportTask::GoalsAnimation,
    ReportTask::GoalsShots3d,
];

fn sample_db() -> MatchDb {
    let rows = generate_matches(&SampleOptions {
        seasons: 3,
        teams: 8,
        ..SampleOptions::default()
    });
    in_memory(&rows).expect("sample db")
}

fn config_in(dir: &std::path::Path) -> ReportConfig {
    ReportConfig {
        output_dir: dir.to_path_buf(),
        ..ReportConfig::default()
    }
}

#[test]
fn html_tasks_write_their_fixed_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = sample_db();
    let summary = report::run_tasks(&db, &HTML_TASKS, &config_in(dir.path())).expect("run");

    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    let written = summary
        .written
        .iter()
        .map(|(_, path)| path.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        written,
        vec![
            dir.path().join("team_radar.html"),
            dir.path().join("goals_animation.html"),
            dir.path().join("goals_shots_3d.html"),
        ]
    );
    for path in &written {
        assert!(path.is_file(), "{} missing", path.display());
    }
}

#[test]
fn render_failure_does_not_stop_other_tasks() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A directory squatting on the artifact path makes that one write fail.
    std::fs::create_dir(dir.path().join("team_radar.html")).expect("blocker");

    let db = sample_db();
    let summary = report::run_tasks(&db, &HTML_TASKS, &config_in(dir.path())).expect("run");

    assert_eq!(summary.failures.len(), 1);
    let (task, err) = &summary.failures[0];
    assert_eq!(*task, ReportTask::TeamRadar);
    assert!(matches!(err, RenderError::Io { .. }));
    assert_eq!(summary.written.len(), 2);
    assert!(dir.path().join("goals_shots_3d.html").is_file());
}

#[test]
fn query_failure_aborts_the_run() {
    let conn = Connection::open_in_memory().expect("conn");
    conn.execute_batch("CREATE TABLE matches (Season TEXT)")
        .expect("schema");
    let db = MatchDb::from_connection(conn, PathBuf::from(":memory:")).expect("db");
    let dir = tempfile::tempdir().expect("tempdir");

    let err = report::run_report(&db, &config_in(dir.path())).expect_err("should abort");
    assert!(matches!(err, DataAccessError::Query { .. }));
}

#[test]
fn database_without_matches_table_is_rejected() {
    let conn = Connection::open_in_memory().expect("conn");
    let err = MatchDb::from_connection(conn, PathBuf::from(":memory:")).expect_err("no table");
    assert!(matches!(err, DataAccessError::MissingTable { .. }));
}

#[test]
fn static_charts_report_missing_columns() {
    let mut table = ResultTable::with_columns(&["season", "avg_home_goals"]);
    table.push_row(vec![Value::Text("2020-2021".into()), Value::Real(1.5)]);

    let err = static_charts::line_area_data(&HOME_AWAY_GOALS, &table).expect_err("missing away");
    assert!(matches!(err, RenderError::Column { chart: "home_away_goals", .. }));
    assert!(matches!(
        static_charts::stacked_bar_layers(&GOALS_DISTRIBUTION, &table),
        Err(RenderError::Column { .. })
    ));
    assert!(matches!(
        static_charts::heatmap_grid(&GOALS_HEATMAP, &table),
        Err(RenderError::Column { .. })
    ));
}

#[test]
fn stacked_layers_follow_bucket_order() {
    let db = sample_db();
    let table = ReportTask::GoalsDistribution.load(&db).expect("query");
    let (seasons, layers) =
        static_charts::stacked_bar_layers(&GOALS_DISTRIBUTION, &table).expect("layers");

    assert_eq!(seasons.len(), 3);
    let labels = layers.iter().map(|l| l.label).collect::<Vec<_>>();
    assert_eq!(labels, vec!["0 goals", "1 goal", "2 goals", "3 goals", "4+ goals"]);
    for (_, top) in &layers[4].segments {
        assert!((top - 100.0).abs() < 1e-6);
    }
}

#[test]
fn missing_database_file_is_an_open_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = MatchDb::open(&dir.path().join("absent.db")).expect_err("missing file");
    assert!(matches!(err, DataAccessError::Open { .. }));
}

#[test]
fn full_report_writes_all_nine_artifacts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = sample_db();
    let config = config_in(dir.path());

    let summary = report::run_report(&db, &config).expect("run");
    assert!(summary.is_success(), "failures: {:?}", summary.failures);
    for task in ReportTask::ALL {
        let path = dir.path().join(task.file_name());
        let meta = std::fs::metadata(&path).expect("artifact");
        assert!(meta.len() > 0, "{} is empty", path.display());
    }
}

#[test]
fn png_reruns_are_byte_identical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = sample_db();
    let config = config_in(dir.path());

    let first = report::run_task(&db, ReportTask::GoalsHeatmap, &config).expect("first");
    let a = std::fs::read(&first).expect("read first");
    let second = report::run_task(&db, ReportTask::GoalsHeatmap, &config).expect("second");
    let b = std::fs::read(&second).expect("read second");
    assert_eq!(a, b);
}
