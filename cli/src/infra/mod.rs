//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the PTY
//! driver, systemd, filesystem access, HTTP, archives, prompts and config
//! loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod archive;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod network;
pub mod prompt;
pub mod pty;
pub mod release;
pub mod systemd;
