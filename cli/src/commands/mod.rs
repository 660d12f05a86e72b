//! Command implementations

pub mod info;
pub mod install;
pub mod menu;
pub mod restart;
pub mod uninstall;
pub mod update;
