//! Dotfiles deployment engine.
//!
//! Deploys files and directories from a local dotfiles repository into the
//! home directory, either as symlinks or as copies. Pre-existing entries are
//! moved aside as timestamped backups, which can later be listed and
//! recovered.
//!
//! The public API is organised into four layers:
//!
//! - **[`engine`]**: deployment, backup discovery, tree copying, and recovery
//!   on explicit paths
//! - **[`config`]**: the `~/.dotdeploy.toml` file and its resolution into
//!   mappings
//! - **[`commands`]**: top-level subcommand orchestration (`import`,
//!   `recover`, `backups`)
//! - **[`logging`]**: console and file output plus the run summary
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
