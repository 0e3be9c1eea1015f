//! Runtime plumbing for Promptbar hosts: logging bootstrap and the event layer
//! that streams toolbar events to a UI.

pub mod logging;
pub mod tracing_layer;

pub use logging::init_tracing;
pub use tracing_layer::{ToolbarEvent, ToolbarEventLayer};
