use crate::error::ModelError;
use crate::mapping::Mappable;
use crate::node::Node;
use crate::selection::Selection;
use crate::transform::Transform;

/// Document plus the one active selection.
#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
}

impl EditorState {
    pub fn new(doc: Node, selection: Selection) -> Self {
        Self { doc, selection }
    }

    /// State with the selection at the first selectable position.
    pub fn with_doc(doc: Node) -> Self {
        let selection = Selection::at_start(&doc);
        Self { doc, selection }
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Start a transaction on this state.
    pub fn tr(&self) -> Transaction {
        Transaction {
            transform: Transform::new(self.doc.clone()),
            before: self.selection.clone(),
            selection: None,
        }
    }

    /// The state after `tr`. A selection the transaction did not set
    /// explicitly is mapped through its edits.
    pub fn apply(&self, tr: Transaction) -> Result<EditorState, ModelError> {
        let selection = tr.selection()?;
        Ok(EditorState {
            doc: tr.transform.doc().clone(),
            selection,
        })
    }
}

/// A set of edits and selection changes applied to an [`EditorState`] as one unit.
#[derive(Debug, Clone)]
pub struct Transaction {
    transform: Transform,
    before: Selection,
    /// Explicitly set selection and the number of steps when it was set.
    selection: Option<(Selection, usize)>,
}

impl Transaction {
    pub fn doc(&self) -> &Node {
        self.transform.doc()
    }

    pub fn doc_changed(&self) -> bool {
        self.transform.doc_changed()
    }

    /// Insert whole nodes at a block boundary.
    pub fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> Result<&mut Self, ModelError> {
        self.transform.insert(pos, nodes)?;
        Ok(self)
    }

    /// Replace the selection. Later edits in this transaction map it.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        let steps = self.transform.mapping().len();
        self.selection = Some((selection, steps));
        self
    }

    /// The selection as it stands after every step so far.
    pub fn selection(&self) -> Result<Selection, ModelError> {
        let mapping = self.transform.mapping();
        match &self.selection {
            Some((selection, steps)) if *steps == mapping.len() => Ok(selection.clone()),
            Some((selection, steps)) => {
                let rest = mapping.slice(*steps);
                map_selection(selection, self.doc(), &rest)
            }
            None if mapping.is_empty() => Ok(self.before.clone()),
            None => map_selection(&self.before, self.doc(), mapping),
        }
    }
}

fn map_selection(
    selection: &Selection,
    doc: &Node,
    mapping: &dyn Mappable,
) -> Result<Selection, ModelError> {
    let mapped = selection.map(doc, mapping)?;
    log::trace!(
        "mapped selection {} -> {}",
        selection.to_json(),
        mapped.to_json()
    );
    Ok(mapped)
}
