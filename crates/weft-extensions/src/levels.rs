//! The chain of nodes around the selection anchor, shared by the focus and
//! diff decorations.

use serde::{Deserialize, Serialize};
use weft_model::{Attrs, Decoration, Node};

/// Which of the nodes containing the anchor get decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    /// Every containing node.
    #[default]
    All,
    /// Only the innermost.
    Deepest,
    /// Only the outermost.
    Shallowest,
}

/// Editor state outside the document that decorations depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorStatus {
    pub editable: bool,
    pub focused: bool,
}

impl Default for EditorStatus {
    fn default() -> Self {
        Self {
            editable: true,
            focused: true,
        }
    }
}

/// A non-text node whose range holds the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentNode {
    pub pos: usize,
    pub node: Node,
    /// 1 for children of the document.
    pub depth: usize,
}

impl CurrentNode {
    pub fn end(&self) -> usize {
        self.pos + self.node.node_size()
    }
}

/// Non-text nodes containing `anchor`, outermost first. A node counts from
/// its opening boundary up to, not including, its closing one.
pub fn current_nodes(doc: &Node, anchor: usize) -> Vec<CurrentNode> {
    let mut chain = Vec::new();
    collect(doc, 0, 1, anchor, &mut chain);
    chain
}

fn collect(
    parent: &Node,
    content_start: usize,
    depth: usize,
    anchor: usize,
    out: &mut Vec<CurrentNode>,
) {
    let mut pos = content_start;
    for child in parent.content().iter() {
        let size = child.node_size();
        if !child.is_text() && anchor >= pos && anchor < pos + size {
            out.push(CurrentNode {
                pos,
                node: child.clone(),
                depth,
            });
            collect(child, pos + 1, depth + 1, anchor, out);
        }
        pos += size;
    }
}

/// Pick the nodes `mode` asks for out of an outermost-first chain.
pub fn select(chain: Vec<CurrentNode>, mode: FocusMode) -> Vec<CurrentNode> {
    match mode {
        FocusMode::All => chain,
        FocusMode::Deepest => chain.into_iter().last().into_iter().collect(),
        FocusMode::Shallowest => chain.into_iter().take(1).collect(),
    }
}

pub(crate) fn node_decorations(nodes: &[CurrentNode], attrs: &Attrs) -> Vec<Decoration> {
    nodes
        .iter()
        .map(|current| Decoration::node(current.pos, current.end(), attrs.clone()))
        .collect()
}
