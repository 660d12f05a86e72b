//! Application services: use-case orchestration.
//!
//! Each service module implements a single procedure by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_patcher;
pub mod install;
pub mod node_info;
pub mod node_state;
pub mod restart;
pub mod stage;
pub mod uninstall;
pub mod update;

/// The host-side adapters a procedure acts through.
///
/// Operator-facing ports (prompts, progress) are passed separately.
pub struct NodeHost<F, S, D, C, R, A> {
    pub fs: F,
    pub supervisor: S,
    pub driver: D,
    pub runner: C,
    pub remote: R,
    pub archive: A,
}
