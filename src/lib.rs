pub mod announce;
pub mod app;
pub mod config;
pub mod debounce;
pub mod entry;
pub mod error;
pub mod form;
pub mod logging;
pub mod query;
pub mod report;
pub mod repository;
pub mod store;
pub mod tui;
pub mod ui;
pub mod weather;
