pub mod calendar;
pub mod config;
pub mod edition;
pub mod export;
pub mod host_series;
pub mod match_csv;
pub mod schedule_parse;
pub mod score;
pub mod stage;
