use epl_report::match_db::{MatchRecord, in_memory};
use epl_report::sample_data::{SampleOptions, generate_matches};
use epl_report::team_profile::{TEAM_COLUMN, TEAM_METRICS, TOP_TEAMS, team_profile};

fn home_game(team: &str, scored: u32, conceded: u32, shots: u32) -> MatchRecord {
    let mut m = MatchRecord::with_score("2020-2021", team, "Visitors", scored, conceded);
    m.home_shots = shots;
    m.home_shots_on_target = shots / 2;
    m.home_fouls = 10;
    m.home_yellow_cards = 2;
    m
}

fn six_team_fixture() -> Vec<MatchRecord> {
    vec![
        home_game("Arsenal", 3, 1, 18),
        home_game("Brighton", 2, 2, 12),
        home_game("Chelsea", 4, 0, 20),
        home_game("Everton", 1, 1, 9),
        home_game("Fulham", 0, 3, 6),
        home_game("Leeds", 2, 0, 14),
    ]
}

#[test]
fn keeps_top_five_scorers_in_order() {
    let db = in_memory(&six_team_fixture()).expect("fixture db");
    let table = team_profile(&db).expect("query");

    assert_eq!(table.len(), TOP_TEAMS);
    // Brighton and Leeds tie on goals scored; the name decides.
    assert_eq!(
        table.text_column(TEAM_COLUMN).unwrap(),
        vec!["Chelsea", "Arsenal", "Brighton", "Leeds", "Everton"]
    );
}

#[test]
fn normalized_metrics_span_unit_interval() {
    let db = in_memory(&six_team_fixture()).expect("fixture db");
    let table = team_profile(&db).expect("query");

    let scored = table.f64_column("avg_goals_scored").unwrap();
    assert_eq!(scored, vec![1.0, 2.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0, 0.0]);

    let shots = table.f64_column("avg_shots").unwrap();
    assert_eq!(shots[0], 1.0);
    assert_eq!(shots[4], 0.0);
}

#[test]
fn constant_metric_maps_to_zero() {
    let db = in_memory(&six_team_fixture()).expect("fixture db");
    let table = team_profile(&db).expect("query");
    // Every fixture side commits 10 fouls at home.
    assert!(table.f64_column("avg_fouls").unwrap().iter().all(|v| *v == 0.0));
    assert!(table.f64_column("avg_cards").unwrap().iter().all(|v| *v == 0.0));
}

#[test]
fn every_metric_is_within_bounds_on_sample_data() {
    let rows = generate_matches(&SampleOptions {
        seasons: 3,
        ..SampleOptions::default()
    });
    let db = in_memory(&rows).expect("sample db");
    let table = team_profile(&db).expect("query");
    assert_eq!(table.len(), TOP_TEAMS);

    for metric in &TEAM_METRICS {
        let values = table.f64_column(metric.column).unwrap();
        assert!(
            values.iter().all(|v| (0.0..=1.0).contains(v)),
            "{} out of range: {values:?}",
            metric.column
        );
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        assert!(max == 1.0 || max == 0.0, "{} max {max}", metric.column);
        assert_eq!(min, 0.0, "{} min", metric.column);
    }
}

#[test]
fn fewer_than_five_teams_is_not_an_error() {
    let db = in_memory(&six_team_fixture()[..2]).expect("fixture db");
    let table = team_profile(&db).expect("query");
    assert_eq!(table.len(), 2);
    assert_eq!(table.f64_column("avg_goals_scored").unwrap(), vec![1.0, 0.0]);
}
