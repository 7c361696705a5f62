use epl_report::match_db::{MatchRecord, in_memory};
use epl_report::sample_data::{SampleOptions, generate_matches};
use epl_report::season_stats::{
    self, DISTRIBUTION_BUCKETS, HEATMAP_BUCKETS, SEASON_COLUMN, SEASON_INDEX_COLUMN,
};

const EPS: f64 = 1e-9;

fn two_season_fixture() -> Vec<MatchRecord> {
    vec![
        MatchRecord::with_score("2020-2021", "Arsenal", "Chelsea", 1, 0),
        MatchRecord::with_score("2020-2021", "Chelsea", "Arsenal", 2, 1),
        MatchRecord::with_score("2021-2022", "Everton", "Fulham", 0, 0),
        MatchRecord::with_score("2021-2022", "Fulham", "Everton", 3, 1),
    ]
}

fn sample_rows() -> Vec<MatchRecord> {
    generate_matches(&SampleOptions {
        seasons: 4,
        teams: 10,
        ..SampleOptions::default()
    })
}

#[test]
fn season_goals_averages_fixture() {
    let db = in_memory(&two_season_fixture()).expect("fixture db");
    let table = season_stats::season_goals(&db).expect("query");

    assert_eq!(
        table.text_column(SEASON_COLUMN).unwrap(),
        vec!["2020-2021", "2021-2022"]
    );
    assert_eq!(table.f64_column("avg_goals_per_match").unwrap(), vec![2.0, 2.0]);
    assert_eq!(table.f64_column("avg_home_goals").unwrap(), vec![1.5, 1.5]);
    assert_eq!(table.f64_column("avg_away_goals").unwrap(), vec![0.5, 0.5]);
}

#[test]
fn high_scoring_rate_counts_four_or_more() {
    let db = in_memory(&two_season_fixture()).expect("fixture db");
    let table = season_stats::high_scoring_rate(&db).expect("query");
    let pct = table.f64_column("high_scoring_percentage").unwrap();
    assert_eq!(pct.len(), 2);
    assert!(pct[0].abs() < EPS);
    assert!((pct[1] - 50.0).abs() < EPS);
}

#[test]
fn second_half_goals_are_full_time_minus_half_time() {
    let mut rows = two_season_fixture();
    rows[0].half_time_home_goals = 1;
    rows[1].half_time_home_goals = 1;
    rows[1].half_time_away_goals = 1;
    let db = in_memory(&rows).expect("fixture db");
    let table = season_stats::season_goals(&db).expect("query");

    let first = table.f64_column("avg_first_half_goals").unwrap();
    let second = table.f64_column("avg_second_half_goals").unwrap();
    assert_eq!(first[0], 1.5);
    assert_eq!(second[0], 0.5);
    assert_eq!(first[1], 0.0);
    assert_eq!(second[1], 2.0);
}

#[test]
fn distribution_percentages_sum_to_hundred() {
    let db = in_memory(&sample_rows()).expect("sample db");
    let table = season_stats::goal_distribution(&db).expect("query");
    assert_eq!(table.len(), 4);

    let columns = DISTRIBUTION_BUCKETS
        .iter()
        .map(|b| table.f64_column(b.column).unwrap())
        .collect::<Vec<_>>();
    for row in 0..table.len() {
        let sum: f64 = columns.iter().map(|c| c[row]).sum();
        assert!((sum - 100.0).abs() < 1e-6, "row {row} sums to {sum}");
    }
}

#[test]
fn distribution_fixture_splits_buckets() {
    let db = in_memory(&two_season_fixture()).expect("fixture db");
    let table = season_stats::goal_distribution(&db).expect("query");
    // 2020-2021: totals 1 and 3. 2021-2022: totals 0 and 4.
    assert_eq!(table.f64_column("one_goal").unwrap(), vec![50.0, 0.0]);
    assert_eq!(table.f64_column("three_goals").unwrap(), vec![50.0, 0.0]);
    assert_eq!(table.f64_column("zero_goals").unwrap(), vec![0.0, 50.0]);
    assert_eq!(table.f64_column("four_plus_goals").unwrap(), vec![0.0, 50.0]);
    assert_eq!(table.f64_column("total_matches").unwrap(), vec![2.0, 2.0]);
}

#[test]
fn heatmap_percentages_sum_to_hundred() {
    let db = in_memory(&sample_rows()).expect("sample db");
    let table = season_stats::goal_heatmap(&db).expect("query");

    let columns = HEATMAP_BUCKETS
        .iter()
        .map(|b| table.f64_column(b.column).unwrap())
        .collect::<Vec<_>>();
    for row in 0..table.len() {
        let sum: f64 = columns.iter().map(|c| c[row]).sum();
        assert!((sum - 100.0).abs() < 1e-6, "row {row} sums to {sum}");
    }
}

#[test]
fn heatmap_separates_four_from_five_plus() {
    let rows = vec![
        MatchRecord::with_score("2022-2023", "Leeds", "Wolves", 2, 2),
        MatchRecord::with_score("2022-2023", "Wolves", "Leeds", 4, 3),
    ];
    let db = in_memory(&rows).expect("fixture db");
    let table = season_stats::goal_heatmap(&db).expect("query");
    assert_eq!(table.f64_column("four_goals").unwrap(), vec![50.0]);
    assert_eq!(table.f64_column("five_plus_goals").unwrap(), vec![50.0]);
}

#[test]
fn seasons_without_matches_are_absent() {
    let mut rows = two_season_fixture();
    rows.retain(|m| m.season != "2021-2022");
    rows.push(MatchRecord::with_score("2023-2024", "Burnley", "Brentford", 1, 1));
    let db = in_memory(&rows).expect("fixture db");

    for table in [
        season_stats::season_goals(&db).unwrap(),
        season_stats::goal_distribution(&db).unwrap(),
        season_stats::high_scoring_rate(&db).unwrap(),
        season_stats::goal_heatmap(&db).unwrap(),
        season_stats::season_trend(&db).unwrap(),
        season_stats::goals_and_shots(&db).unwrap(),
    ] {
        assert_eq!(
            table.text_column(SEASON_COLUMN).unwrap(),
            vec!["2020-2021", "2023-2024"]
        );
    }
}

#[test]
fn goals_and_shots_adds_season_index() {
    let mut rows = two_season_fixture();
    for m in rows.iter_mut() {
        m.home_shots = 10;
        m.away_shots = 6;
    }
    let db = in_memory(&rows).expect("fixture db");
    let table = season_stats::goals_and_shots(&db).expect("query");
    assert_eq!(table.f64_column(SEASON_INDEX_COLUMN).unwrap(), vec![0.0, 1.0]);
    assert_eq!(table.f64_column("avg_shots").unwrap(), vec![16.0, 16.0]);
    assert_eq!(table.f64_column("avg_goals").unwrap(), vec![2.0, 2.0]);
}

#[test]
fn empty_database_yields_empty_tables() {
    let db = in_memory(&[]).expect("empty db");
    assert!(season_stats::season_goals(&db).unwrap().is_empty());
    assert!(season_stats::goal_heatmap(&db).unwrap().is_empty());
    let indexed = season_stats::goals_and_shots(&db).unwrap();
    assert!(indexed.is_empty());
    assert!(indexed.has_column(SEASON_INDEX_COLUMN));
}
