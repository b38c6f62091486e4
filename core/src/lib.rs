//! Report-construction event-log replay engine.
//!
//! Reconstructs the hierarchical state of a verification run from an
//! ordered log of lifecycle events and drives a speed-controlled,
//! forward-only replay of that reconstruction. The crate owns the tree
//! model; a display is a downstream projection fed through the
//! [`sink::StructuralSink`] seam and never consulted for state.

// All user-visible output goes through tracing or the audit surface.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod audit;
pub mod loader;
pub mod reconstructor;
pub mod registry;
pub mod scheduler;
pub mod sink;
pub mod tree;

pub use audit::AuditLog;
pub use audit::AuditRow;
pub use loader::LoadError;
pub use loader::parse_log;
pub use reconstructor::ApplyOutcome;
pub use reconstructor::ReplayState;
pub use registry::EntityRegistry;
pub use scheduler::EndOfLog;
pub use scheduler::ReplayMode;
pub use scheduler::ReplayScheduler;
pub use sink::RecordingSink;
pub use sink::StructuralSink;
pub use tree::ReportNode;
pub use tree::ReportTree;
