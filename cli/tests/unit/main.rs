//! Unit tests for the ovnode application services.
//!
//! These tests use in-memory fakes for every port and run without touching
//! the host.

mod architecture;
mod helpers;
mod install_service;
