//! Core domain types
//!
//! This module contains the core domain structures used by the runner.
//! Every value here is a snapshot fetched from (or pushed to) the control
//! plane; nothing is cached or mutated concurrently.

pub mod build;
pub mod git_provider;
pub mod job;
pub mod log;
pub mod registry;
pub mod runner;
pub mod server;
pub mod target;
pub mod workspace;
