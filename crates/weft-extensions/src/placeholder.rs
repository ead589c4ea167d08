//! Placeholder decorations for empty nodes.
//!
//! Each empty node (one that may hold content but has none) near the
//! anchor gets `empty_node_class` and a `data-placeholder` attribute for
//! the stylesheet to render. When the whole document is in its freshly
//! created state, `empty_editor_class` is added as well.

use std::fmt;
use std::sync::Arc;

use weft_model::{Attrs, Decoration, DecorationSet, EditorState, Node, Visit};

use crate::levels::EditorStatus;

/// What is passed to a [`Placeholder::Dynamic`] callback.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderProps<'a> {
    pub node: &'a Node,
    pub pos: usize,
    pub has_anchor: bool,
}

/// Placeholder text, fixed or computed per node.
#[derive(Clone)]
pub enum Placeholder {
    Text(String),
    Dynamic(Arc<dyn Fn(PlaceholderProps<'_>) -> String + Send + Sync>),
}

impl Placeholder {
    pub fn dynamic(f: impl Fn(PlaceholderProps<'_>) -> String + Send + Sync + 'static) -> Self {
        Placeholder::Dynamic(Arc::new(f))
    }

    fn text_for(&self, props: PlaceholderProps<'_>) -> String {
        match self {
            Placeholder::Text(text) => text.clone(),
            Placeholder::Dynamic(f) => f(props),
        }
    }
}

impl Default for Placeholder {
    fn default() -> Self {
        Placeholder::Text("Write something …".to_string())
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Placeholder::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceholderOptions {
    pub empty_editor_class: String,
    pub empty_node_class: String,
    pub placeholder: Placeholder,
    /// Draw nothing while the editor is read-only.
    pub show_only_when_editable: bool,
    /// Only decorate the empty node holding the anchor.
    pub show_only_current: bool,
    /// Look inside nested nodes, not just the document's children.
    pub include_children: bool,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            empty_editor_class: "is-editor-empty".to_string(),
            empty_node_class: "is-empty".to_string(),
            placeholder: Placeholder::default(),
            show_only_when_editable: true,
            show_only_current: true,
            include_children: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderDecorations {
    options: PlaceholderOptions,
}

impl PlaceholderDecorations {
    pub fn new(options: PlaceholderOptions) -> Self {
        Self { options }
    }

    /// `None` when placeholders are switched off for a read-only editor.
    pub fn decorations(&self, state: &EditorState, status: EditorStatus) -> Option<DecorationSet> {
        let options = &self.options;
        if !status.editable && options.show_only_when_editable {
            return None;
        }

        let doc = state.doc();
        let anchor = state.selection().anchor();
        let editor_empty = *doc == doc.node_type().create_and_fill();
        let class = if editor_empty {
            format!("{} {}", options.empty_node_class, options.empty_editor_class)
        } else {
            options.empty_node_class.clone()
        };

        let mut decorations = Vec::new();
        doc.descendants(|node, pos| {
            let end = pos + node.node_size();
            let has_anchor = anchor >= pos && anchor <= end;
            let empty = !node.is_leaf() && node.child_count() == 0;
            if (has_anchor || !options.show_only_current) && empty {
                let text = options.placeholder.text_for(PlaceholderProps {
                    node,
                    pos,
                    has_anchor,
                });
                let attrs = Attrs::from([
                    ("class".to_string(), class.clone()),
                    ("data-placeholder".to_string(), text),
                ]);
                decorations.push(Decoration::node(pos, end, attrs));
            }
            if options.include_children {
                Visit::Descend
            } else {
                Visit::SkipChildren
            }
        });
        log::trace!("placeholder: {} empty node(s)", decorations.len());

        Some(DecorationSet::create(doc, decorations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use weft_model::builders::{blockquote, doc, p};
    use weft_model::{Selection, TextSelection};

    fn at(d: &Node, pos: usize) -> EditorState {
        EditorState::new(d.clone(), TextSelection::create(d, pos, pos).unwrap().into())
    }

    fn render(options: PlaceholderOptions, state: &EditorState) -> String {
        PlaceholderDecorations::new(options)
            .decorations(state, EditorStatus::default())
            .unwrap()
            .to_string()
    }

    #[test]
    fn empty_editor() {
        let state = EditorState::with_doc(doc(vec![p("")]));
        assert_snapshot!(
            render(PlaceholderOptions::default(), &state),
            @r#"node 0..2 class="is-empty is-editor-empty" data-placeholder="Write something …""#
        );
    }

    #[test]
    fn only_the_current_empty_node_by_default() {
        // p("A") 0..3, p 3..5, p 5..7
        let d = doc(vec![p("A"), p(""), p("")]);
        assert_snapshot!(
            render(PlaceholderOptions::default(), &at(&d, 4)),
            @r#"node 3..5 class="is-empty" data-placeholder="Write something …""#
        );
        assert_eq!(render(PlaceholderOptions::default(), &at(&d, 1)), "");
    }

    #[test]
    fn every_empty_node_when_not_limited_to_current() {
        let d = doc(vec![p("A"), p(""), p("")]);
        let options = PlaceholderOptions {
            show_only_current: false,
            placeholder: Placeholder::dynamic(|props| {
                format!("{} at {}{}", props.node.type_name(), props.pos, if props.has_anchor { " *" } else { "" })
            }),
            ..PlaceholderOptions::default()
        };
        assert_snapshot!(render(options, &at(&d, 4)), @r#"
        node 3..5 class="is-empty" data-placeholder="paragraph at 3 *"
        node 5..7 class="is-empty" data-placeholder="paragraph at 5"
        "#);
    }

    #[test]
    fn nested_nodes_need_include_children() {
        // blockquote 0..4 holding an empty paragraph 1..3
        let d = doc(vec![blockquote(vec![p("")])]);
        let state = at(&d, 2);
        assert_eq!(render(PlaceholderOptions::default(), &state), "");

        let options = PlaceholderOptions {
            include_children: true,
            ..PlaceholderOptions::default()
        };
        assert_snapshot!(
            render(options, &state),
            @r#"node 1..3 class="is-empty" data-placeholder="Write something …""#
        );
    }

    #[test]
    fn read_only_editor() {
        let state = EditorState::new(
            doc(vec![p("")]),
            Selection::at_start(&doc(vec![p("")])),
        );
        let status = EditorStatus {
            editable: false,
            focused: true,
        };
        assert!(
            PlaceholderDecorations::default()
                .decorations(&state, status)
                .is_none()
        );

        let shown = PlaceholderDecorations::new(PlaceholderOptions {
            show_only_when_editable: false,
            ..PlaceholderOptions::default()
        });
        assert_eq!(shown.decorations(&state, status).map(|set| set.len()), Some(1));
    }
}
