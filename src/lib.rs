// Library target exists solely for criterion benchmarks and integration
// tests. The binary entry point is main.rs; this file re-declares the module
// tree so harnesses can import types via `studywire::session::*` /
// `studywire::ui::*`. Most code is only exercised through the binary, so
// suppress dead_code warnings.
#![allow(dead_code)]

// Public: used directly by benchmarks and tests
pub mod api;
pub mod session;
pub mod ui;

// Private: required transitively (won't compile without them)
mod app;
mod config;
mod event;
