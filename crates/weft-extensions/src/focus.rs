//! Focus decorations: mark the nodes that hold the selection anchor.

use weft_model::{Attrs, DecorationSet, EditorState};

use crate::levels::{EditorStatus, FocusMode, current_nodes, node_decorations, select};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusOptions {
    pub class_name: String,
    pub mode: FocusMode,
}

impl Default for FocusOptions {
    fn default() -> Self {
        Self {
            class_name: "has-focus".to_string(),
            mode: FocusMode::All,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusClasses {
    options: FocusOptions,
}

impl FocusClasses {
    pub fn new(options: FocusOptions) -> Self {
        Self { options }
    }

    /// Nothing is marked while the editor is read-only or unfocused.
    pub fn decorations(&self, state: &EditorState, status: EditorStatus) -> DecorationSet {
        if !status.editable || !status.focused {
            return DecorationSet::empty();
        }
        let anchor = state.selection().anchor();
        let nodes = select(current_nodes(state.doc(), anchor), self.options.mode);
        log::trace!("focus: {} node(s) around {anchor}", nodes.len());

        let attrs = Attrs::from([("class".to_string(), self.options.class_name.clone())]);
        DecorationSet::create(state.doc(), node_decorations(&nodes, &attrs))
    }
}
