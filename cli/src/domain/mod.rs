//! Domain layer: pure business logic, types, and text transforms.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod env_file;
pub mod error;
pub mod expect;
pub mod info;
pub mod node;
pub mod patch;
pub mod unit;

pub use config::InstallerConfig;
pub use error::{ProvisionError, StageFailed};
pub use expect::{ExpectScript, ExpectStep};
pub use info::{NodeInfo, ServiceStatus};
pub use node::{DesiredNodeConfig, Protocol};
pub use unit::{ServiceUnit, unit_file_name};
