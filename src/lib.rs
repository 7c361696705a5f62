pub mod config;
pub mod error;
pub mod fonts;
pub mod html_charts;
pub mod logging;
pub mod match_db;
pub mod report;
pub mod result_table;
pub mod sample_data;
pub mod season_stats;
pub mod static_charts;
pub mod team_profile;
