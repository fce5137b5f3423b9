//! Data Transfer Objects for the control-plane API
//!
//! Wire representations of the domain entities. DTOs use camelCase JSON and
//! their own enum types; translation to and from the domain lives next to
//! each DTO, either as `From` (infallible) or `Convert` (tri-state).

pub mod build;
pub mod env;
pub mod git_provider;
pub mod job;
pub mod runner;
pub mod server;
pub mod target;
pub mod workspace;
