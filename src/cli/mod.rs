//! Command Line Interface (CLI) layer for HLS-VI.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-granule and batch
//! processing flows. It wires user-provided options to the underlying
//! library functionality exposed via `hls_vi::api`.
//!
//! If you are embedding HLS-VI into another application, prefer using
//! the high-level `hls_vi::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
