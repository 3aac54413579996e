//! A scripted stand-in for a host platform.
//!
//! [`SimulatedHost`] keeps its own grant table and answers prompts and
//! settings screens from a [`UserScript`], reproducing the authority quirks
//! the orchestrator has to correct for. Everything it is asked to do ends up
//! in a journal.

mod script;
mod simulated;

pub use script::{PromptDecision, SettingsDecision, UserScript};
pub use simulated::{HostEvent, ResponseMode, SimulatedHost};
