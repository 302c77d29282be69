pub mod commands;
pub mod logging;
pub mod scenario;

pub use scenario::{Scenario, ScenarioError};
