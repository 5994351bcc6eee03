pub(crate) mod extraction;
mod orchestrator;
pub(crate) mod pagination;
pub(crate) mod ppg;
pub(crate) mod validation;

pub use orchestrator::Orchestrator;
