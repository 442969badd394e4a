//! Command pipeline
//!
//! text -> interpreter (llm::parser) -> Vec<PartialUpdate> -> reconciler -> devices

pub mod executor;
pub mod panel;
pub mod reconciler;

pub use executor::{CommandOutcome, CommandSession};
pub use panel::{route, PanelInput};
pub use reconciler::apply_updates;
