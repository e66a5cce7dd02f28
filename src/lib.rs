// Library surface for headless/integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod display;
pub mod error;
pub mod input;
pub mod logging;
pub mod matching;
pub mod menu;
pub mod runtime;
pub mod scores;
pub mod scoring;
pub mod sequence;
pub mod session;
pub mod stimulus;
pub mod trial;
pub mod ui;
