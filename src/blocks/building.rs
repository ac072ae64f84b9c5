//! Building
//!
//!     Turns a concrete parse tree into a [Blueprint] using the template table. Templates are
//!     keyed by rule and alternative names, never by surface forms, which is why a statement
//!     typed in any enabled locale builds the same blueprint.

pub mod blueprint;
pub mod evaluator;
pub mod template;

pub use blueprint::Blueprint;
pub use evaluator::{normalize_quotes, EvaluateError, Evaluator};
pub use template::{Segment, Slot, Template, TemplateError, TemplateTable, TemplateValue};
