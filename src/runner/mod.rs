//! Checkout scenario runner
//!
//! Executes the fixed checkout step sequence fail-fast against the provider
//! API and a browser session, and reduces the run to one immutable
//! [`ScenarioResult`].

mod runner;
mod scenario;

pub use runner::CheckoutRunner;
pub use scenario::{ScenarioResult, ScenarioStatus, Step};
