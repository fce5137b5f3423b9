//! Keel Core
//!
//! Core types and abstractions shared by the Keel runner and its API client.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Workspace, Target, Build, etc.)
//! - DTOs: Wire representations exchanged with the control-plane API
//! - Conversion: Tri-state translation between DTOs and domain types
//! - Env: Environment variable merging and container registry extraction

pub mod conversion;
pub mod domain;
pub mod dto;
pub mod env;
