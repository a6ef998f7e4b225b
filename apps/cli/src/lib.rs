//! bankfetch command line: configuration, logging and state wiring for one
//! sync run.

pub mod config;
mod main_lib;

pub use config::Config;
pub use main_lib::{build_state, init_tracing, run, AppState};
