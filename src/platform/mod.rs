// RoboTrace - platform/mod.rs
//
// Platform abstraction layer: filesystem-facing input reading, config
// loading and the diagnostic log.
// Dependencies: core model types, directories, calamine, csv, toml.
// Must NOT depend on: app.

pub mod config;
pub mod diag_log;
pub mod sheet;
