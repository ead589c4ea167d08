//! Document model consumed by the weft editor extensions.
//!
//! A deliberately small host: typed nodes with capability flags, linear
//! positions and their resolution, position mapping through inserts, and a
//! selection union open to custom variants. The gap cursor and the
//! decoration extensions are written against this crate only.

pub mod builders;
pub mod decoration;
pub mod error;
pub mod mapping;
pub mod node;
pub mod resolved;
pub mod schema;
pub mod selection;
pub mod state;
pub mod transform;

pub use decoration::{Attrs, Decoration, DecorationSet};
pub use error::ModelError;
pub use mapping::{Assoc, MapRange, Mappable, Mapping, StepMap};
pub use node::{Fragment, Node, Slice, Visit};
pub use resolved::ResolvedPos;
pub use schema::{ContentKind, NodeSpec, NodeType, Schema, TEXT_TYPE};
pub use selection::{
    AllSelection, CustomSelection, Dir, NodeSelection, Selection, SelectionBookmark,
    SelectionDecoder, SelectionRegistry, TextSelection,
};
pub use state::{EditorState, Transaction};
pub use transform::Transform;
