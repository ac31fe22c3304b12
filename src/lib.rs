//! jobwatch — terminal companion client for job task-monitor panels.
//!
//! Talks to a server-rendered task monitor over HTTP and reproduces the
//! panel's page behavior headlessly: the control panel's auto-refresh
//! countdown ([`dashboard`]), the task page's poll/countdown/static refresh
//! state machine ([`task`]), and the retype-to-confirm rerun and
//! enable/disable actions ([`actions`]).

pub mod actions;
pub mod cli;
pub mod clock;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod jobs;
pub mod panel;
pub mod task;
pub mod view;
