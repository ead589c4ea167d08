//! Decorations derived from the selection: focus and diff classes on the
//! nodes around the anchor, and placeholders for empty nodes.

pub mod diff;
pub mod focus;
pub mod levels;
pub mod placeholder;

pub use diff::{DiffClasses, DiffOptions};
pub use focus::{FocusClasses, FocusOptions};
pub use levels::{CurrentNode, EditorStatus, FocusMode, current_nodes};
pub use placeholder::{Placeholder, PlaceholderDecorations, PlaceholderOptions, PlaceholderProps};
