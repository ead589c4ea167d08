//! Gap cursor: a selection for positions no text caret can reach.
//!
//! Register the selection type with [`GapCursor::register`] so its JSON form
//! can be decoded, and route key, click and `beforeinput` events through a
//! [`GapCursorPlugin`].

pub mod bookmark;
pub mod error;
pub mod gap_cursor;
pub mod plugin;

pub use bookmark::GapBookmark;
pub use error::GapCursorError;
pub use gap_cursor::{GAP_CURSOR_JSON_ID, GapCursor};
pub use plugin::{
    Axis, BeforeInput, ClickPolicy, Direction, EditorView, GAP_CURSOR_CLASS, GapCursorPlugin,
    ModelView, Propagation, arrow, draw_gap_cursor,
};
