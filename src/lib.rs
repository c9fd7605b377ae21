//! usageline - Claude Code status line.
//!
//! Reads the status payload from stdin and prints model, directory, branch,
//! context occupancy and rolling-window quota usage.

pub mod app;
pub mod config;
pub mod git;
pub mod input;
pub mod render;
