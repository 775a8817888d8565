mod app;
mod effects;
mod logging;
mod output;
mod persistence;
mod ui;

pub use app::run_app;
