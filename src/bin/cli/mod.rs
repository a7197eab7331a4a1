//! CLI Module Organization
//!
//! - args: flag definitions
//! - commands: running a move
//! - config_layer: configuration file and flag merging
//! - output: console summary

pub mod args;
pub mod commands;
pub mod config_layer;
pub mod output;

pub use args::Cli;
pub use commands::run_move;
