//! Agent runtime: composes Transport, Discovery, the
//! Tool Router, and Monitoring into the Interface/Primary/Specialist/
//! Function roles.

mod agent;
mod error;
mod function_service;
mod interface;

pub use agent::Agent;
pub use error::AgentError;
pub use function_service::{FunctionDef, FunctionService};
pub use interface::InterfaceClient;
