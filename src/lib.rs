// Library surface for the binary, headless tests and alternative front ends.
pub mod app;
pub mod app_dirs;
pub mod board;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod palette;
pub mod presenter;
pub mod runtime;
pub mod ui;
