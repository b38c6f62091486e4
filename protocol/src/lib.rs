//! Wire vocabulary for the report-construction replay engine.
//!
//! Holds the closed stage enumeration, the typed event model, and the
//! structural operations the core emits toward a tree display. The core
//! crate depends on this one; nothing here depends on the core.

pub mod event;
pub mod ops;
pub mod stage;

pub use event::Event;
pub use event::EventKind;
pub use ops::Diagnostic;
pub use ops::NodeKind;
pub use ops::NodeStatus;
pub use ops::ROOT_ID;
pub use ops::StructuralOp;
pub use stage::Stage;
pub use stage::StageShape;
