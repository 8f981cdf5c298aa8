pub mod config;
pub mod eligibility;
pub mod engine;
pub mod event_stream;
pub mod http_client;
pub mod league_api;
pub mod league_state;
pub mod projection_table;
pub mod projector;
pub mod providers;
pub mod sink;
pub mod statsheets;
