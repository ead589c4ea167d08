//! Diff decorations.
//!
//! Marks the same nodes as the focus decorations, but with a separate
//! class and extra attributes so a diff view can style and identify the
//! block being compared.

use weft_model::{Attrs, DecorationSet, EditorState};

use crate::levels::{EditorStatus, FocusMode, current_nodes, node_decorations, select};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    pub class_name: String,
    pub mode: FocusMode,
    /// Added to every decoration next to `class`.
    pub attributes: Attrs,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            class_name: "has-diff".to_string(),
            mode: FocusMode::All,
            attributes: Attrs::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffClasses {
    options: DiffOptions,
}

impl DiffClasses {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn decorations(&self, state: &EditorState, status: EditorStatus) -> DecorationSet {
        if !status.editable || !status.focused {
            return DecorationSet::empty();
        }
        let anchor = state.selection().anchor();
        let nodes = select(current_nodes(state.doc(), anchor), self.options.mode);
        log::trace!("diff: {} node(s) around {anchor}", nodes.len());

        let mut attrs = self.options.attributes.clone();
        attrs.insert("class".to_string(), self.options.class_name.clone());
        DecorationSet::create(state.doc(), node_decorations(&nodes, &attrs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use weft_model::builders::{blockquote, doc, hr, p};
    use weft_model::{NodeSelection, TextSelection};

    #[test]
    fn attributes_travel_with_the_class() {
        let d = doc(vec![blockquote(vec![p("Old"), p("New")])]);
        let state = EditorState::new(d.clone(), TextSelection::create(&d, 7, 7).unwrap().into());
        let diff = DiffClasses::new(DiffOptions {
            mode: FocusMode::Deepest,
            attributes: Attrs::from([
                ("data-diff".to_string(), "changed".to_string()),
                ("id".to_string(), "block-2".to_string()),
            ]),
            ..DiffOptions::default()
        });
        let set = diff.decorations(&state, EditorStatus::default());
        assert_snapshot!(set.to_string(), @r#"node 6..11 class="has-diff" data-diff="changed" id="block-2""#);
    }

    #[test]
    fn class_attribute_wins_over_extra_attributes() {
        let d = doc(vec![hr()]);
        let state = EditorState::new(d.clone(), NodeSelection::create(&d, 0).unwrap().into());
        let diff = DiffClasses::new(DiffOptions {
            attributes: Attrs::from([("class".to_string(), "ignored".to_string())]),
            ..DiffOptions::default()
        });
        let set = diff.decorations(&state, EditorStatus::default());
        assert_snapshot!(set.to_string(), @r#"node 0..1 class="has-diff""#);
    }

    #[test]
    fn read_only_editor_has_no_diff_marks() {
        let d = doc(vec![p("A")]);
        let state = EditorState::with_doc(d);
        let status = EditorStatus {
            editable: false,
            focused: true,
        };
        assert!(DiffClasses::default().decorations(&state, status).is_empty());
    }
}
