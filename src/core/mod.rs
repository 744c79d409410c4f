// RoboTrace - core/mod.rs
//
// Core business logic layer: value translation, row normalisation,
// timeline scanning and report assembly.
// Dependencies: standard library, chrono, regex, serde.
// Must NOT depend on: platform, app, or any I/O crate directly.

pub mod labels;
pub mod model;
pub mod normalize;
pub mod report;
pub mod timeline;
