// RoboTrace - app/mod.rs
//
// Application layer: orchestration of one analysis request.
// Dependencies: core, platform, util.

pub mod fetch;
