//! Scheduler layer for the runner
//!
//! Polls the control plane for pending jobs and drives each one from
//! `running` to `success` or `error`, pushing runner metadata alongside.

pub mod poller;

pub use poller::JobPoller;
