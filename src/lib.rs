// RoboTrace - lib.rs
//
// Library entry point, exposing every layer for integration testing and
// programmatic use. The `robotrace` binary in `main.rs` is a thin CLI over
// `app::fetch`.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
