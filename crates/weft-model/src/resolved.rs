use std::fmt;

use crate::error::ModelError;
use crate::node::Node;

#[derive(Clone)]
struct PathEntry {
    node: Node,
    /// Index of the child this position sits in or before.
    index: usize,
    /// Absolute position at which that child starts.
    offset: usize,
}

/// A position with its full ancestor chain resolved.
///
/// Depth 0 is the document itself; `depth()` is the innermost node that
/// directly contains the position.
#[derive(Clone)]
pub struct ResolvedPos {
    pos: usize,
    path: Vec<PathEntry>,
    parent_offset: usize,
}

impl ResolvedPos {
    pub(crate) fn resolve(doc: &Node, pos: usize) -> Result<Self, ModelError> {
        let size = doc.content().size();
        if pos > size {
            return Err(ModelError::PositionOutOfRange { pos, size });
        }

        let mut path = Vec::new();
        let mut start = 0;
        let mut parent_offset = pos;
        let mut node = doc.clone();
        loop {
            let (index, offset) = node.content().find_index(parent_offset);
            let rem = parent_offset - offset;
            path.push(PathEntry {
                node: node.clone(),
                index,
                offset: start + offset,
            });
            if rem == 0 {
                break;
            }
            let child = node.child(index).clone();
            if child.is_text() {
                break;
            }
            parent_offset = rem - 1;
            start += offset + 1;
            node = child;
        }

        Ok(Self {
            pos,
            path,
            parent_offset,
        })
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    pub fn doc(&self) -> &Node {
        &self.path[0].node
    }

    /// The ancestor at depth `d`.
    ///
    /// # Panics
    /// Panics when `d > self.depth()`.
    pub fn node(&self, d: usize) -> &Node {
        &self.path[d].node
    }

    pub fn parent(&self) -> &Node {
        self.node(self.depth())
    }

    /// Offset of this position inside its parent's content.
    pub fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Index into the ancestor at depth `d`.
    pub fn index(&self, d: usize) -> usize {
        self.path[d].index
    }

    /// Index pointing after this position into the ancestor at depth `d`.
    pub fn index_after(&self, d: usize) -> usize {
        let extra = if d == self.depth() && self.text_offset() == 0 {
            0
        } else {
            1
        };
        self.index(d) + extra
    }

    /// Distance from the start of the text node this position sits in, or 0.
    pub fn text_offset(&self) -> usize {
        self.pos - self.path[self.depth()].offset
    }

    /// Start of the content of the ancestor at depth `d`.
    pub fn start(&self, d: usize) -> usize {
        if d == 0 { 0 } else { self.path[d - 1].offset + 1 }
    }

    /// End of the content of the ancestor at depth `d`.
    pub fn end(&self, d: usize) -> usize {
        self.start(d) + self.node(d).content().size()
    }

    /// Position directly before the ancestor at depth `d`. The document
    /// has no position before it, so depth 0 yields `None`.
    pub fn before(&self, d: usize) -> Option<usize> {
        if d == 0 || d > self.depth() + 1 {
            return None;
        }
        if d == self.depth() + 1 {
            return Some(self.pos);
        }
        Some(self.path[d - 1].offset)
    }

    /// Position directly after the ancestor at depth `d`.
    pub fn after(&self, d: usize) -> Option<usize> {
        if d == 0 || d > self.depth() + 1 {
            return None;
        }
        if d == self.depth() + 1 {
            return Some(self.pos);
        }
        Some(self.path[d - 1].offset + self.path[d].node.node_size())
    }

    /// The node directly after this position, cut when inside text.
    pub fn node_after(&self) -> Option<Node> {
        let parent = self.parent();
        let index = self.index(self.depth());
        let child = parent.maybe_child(index)?;
        let offset = self.text_offset();
        if offset > 0 {
            Some(child.cut(offset, child.node_size()))
        } else {
            Some(child.clone())
        }
    }

    /// The node directly before this position, cut when inside text.
    pub fn node_before(&self) -> Option<Node> {
        let index = self.index(self.depth());
        let offset = self.text_offset();
        if offset > 0 {
            return self.parent().maybe_child(index).map(|c| c.cut(0, offset));
        }
        if index == 0 {
            return None;
        }
        self.parent().maybe_child(index - 1).cloned()
    }

    /// Deepest depth whose content range contains `pos`.
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&d| self.start(d) <= pos && self.end(d) >= pos)
            .unwrap_or(0)
    }
}

impl PartialEq for ResolvedPos {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos && self.doc() == other.doc()
    }
}

impl fmt::Debug for ResolvedPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain: Vec<String> = self
            .path
            .iter()
            .map(|e| format!("{}_{}", e.node.type_name(), e.index))
            .collect();
        write!(f, "{}:{}", chain.join("/"), self.parent_offset)
    }
}

impl fmt::Display for ResolvedPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{blockquote, doc, hr, p};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn resolves_inside_text() {
        let d = doc(vec![p("AB"), hr()]);
        let rp = d.resolve(2).unwrap();
        assert_eq!(rp.depth(), 1);
        assert_eq!(rp.parent().type_name(), "paragraph");
        assert_eq!(rp.parent_offset(), 1);
        assert_eq!(rp.index(1), 0);
        assert_eq!(rp.text_offset(), 1);
        assert_eq!(rp.index_after(1), 1);
        assert_eq!(rp.start(1), 1);
        assert_eq!(rp.end(1), 3);
        assert_eq!(rp.before(1), Some(0));
        assert_eq!(rp.after(1), Some(4));
        assert_eq!(rp.node_before().and_then(|n| n.text().map(str::to_string)), Some("A".to_string()));
        assert_eq!(rp.node_after().and_then(|n| n.text().map(str::to_string)), Some("B".to_string()));
    }

    #[test]
    fn resolves_between_blocks() {
        let d = doc(vec![p("AB"), hr()]);
        let rp = d.resolve(4).unwrap();
        assert_eq!(rp.depth(), 0);
        assert_eq!(rp.index(0), 1);
        assert_eq!(rp.index_after(0), 1);
        assert_eq!(rp.node_after().map(|n| n.type_name().to_string()), Some("horizontal_rule".to_string()));
        assert_eq!(rp.node_before().map(|n| n.type_name().to_string()), Some("paragraph".to_string()));
        assert_eq!(rp.before(0), None);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 2)]
    #[case(4, 1)]
    #[case(5, 0)]
    #[case(6, 1)]
    #[case(7, 0)]
    fn nested_depths(#[case] pos: usize, #[case] depth: usize) {
        // blockquote(paragraph("A")) paragraph("")
        let d = doc(vec![blockquote(vec![p("A")]), p("")]);
        assert_eq!(d.resolve(pos).unwrap().depth(), depth);
    }

    #[test]
    fn out_of_range_is_an_error() {
        let d = doc(vec![p("A")]);
        assert_eq!(
            d.resolve(4).unwrap_err(),
            ModelError::PositionOutOfRange { pos: 4, size: 3 }
        );
    }

    #[test]
    fn shared_depth_of_sibling_blocks_is_the_document() {
        let d = doc(vec![p("Hello"), p("World")]);
        let rp = d.resolve(3).unwrap();
        assert_eq!(rp.shared_depth(5), 1);
        assert_eq!(rp.shared_depth(10), 0);
    }
}
