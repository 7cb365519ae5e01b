//! Black-box contract checks for the classified-ads listings API.
//! The CLI and the integration tests both drive the scenarios defined here.

pub mod client;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod runner;
pub mod scenarios;

pub use crate::client::{ApiResponse, ListingsClient};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::models::*;
pub use crate::runner::{Outcome, RunSummary, Runner, ScenarioReport};
pub use crate::scenarios::Scenario;
