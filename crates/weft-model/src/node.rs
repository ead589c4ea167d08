//! Immutable document nodes.
//!
//! Positions count the way the host editor counts them: every character
//! of text is one unit, a leaf is one unit, and a node with content adds
//! one unit for its opening and one for its closing boundary.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::error::ModelError;
use crate::resolved::ResolvedPos;
use crate::schema::{ContentKind, NodeType, Schema};

/// Signal returned by a traversal visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Visit this node's children next.
    Descend,
    /// Skip this node's children and continue with its next sibling.
    SkipChildren,
    /// End the traversal.
    Stop,
}

/// An ordered, shared list of child nodes.
#[derive(Clone)]
pub struct Fragment {
    nodes: Arc<[Node]>,
    size: usize,
}

impl Fragment {
    pub fn empty() -> Self {
        Self {
            nodes: Arc::from(Vec::new()),
            size: 0,
        }
    }

    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let size = nodes.iter().map(Node::node_size).sum();
        Self {
            nodes: Arc::from(nodes),
            size,
        }
    }

    /// Total size of the content.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn child_count(&self) -> usize {
        self.nodes.len()
    }

    /// The child at `index`.
    ///
    /// # Panics
    /// Panics when `index` is out of range. Use [`Fragment::maybe_child`]
    /// when the index is not known to be valid.
    pub fn child(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Find the child index at `pos`, rounding towards the child that
    /// starts at or before it. Returns `(index, offset of that child)`.
    pub fn find_index(&self, pos: usize) -> (usize, usize) {
        if pos == 0 {
            return (0, 0);
        }
        if pos >= self.size {
            return (self.nodes.len(), self.size);
        }
        let mut cur = 0;
        for (i, child) in self.nodes.iter().enumerate() {
            let end = cur + child.node_size();
            if end >= pos {
                if end == pos {
                    return (i + 1, end);
                }
                return (i, cur);
            }
            cur = end;
        }
        (self.nodes.len(), self.size)
    }

    /// Cut out the content between `from` and `to`.
    pub fn cut(&self, from: usize, to: usize) -> Fragment {
        if from == 0 && to == self.size {
            return self.clone();
        }
        let mut result = Vec::new();
        if to > from {
            let mut pos = 0;
            for child in self.nodes.iter() {
                if pos >= to {
                    break;
                }
                let end = pos + child.node_size();
                if end > from {
                    let child = if pos < from || end > to {
                        if child.is_text() {
                            child.cut(from.saturating_sub(pos), (to - pos).min(child.node_size()))
                        } else {
                            child.cut(
                                from.saturating_sub(pos + 1),
                                (to.saturating_sub(pos + 1)).min(child.content.size),
                            )
                        }
                    } else {
                        child.clone()
                    };
                    result.push(child);
                }
                pos = end;
            }
        }
        Fragment::from_nodes(result)
    }

    /// Walk every node overlapping `from..to`, depth first. `base` is the
    /// absolute position at which this fragment starts.
    pub(crate) fn nodes_between<F>(&self, from: usize, to: usize, base: usize, f: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        let mut pos = 0;
        for child in self.nodes.iter() {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from {
                match f(child, base + pos) {
                    Visit::Stop => return ControlFlow::Break(()),
                    Visit::SkipChildren => {}
                    Visit::Descend => {
                        if child.content.size > 0 {
                            let start = pos + 1;
                            child.content.nodes_between(
                                from.saturating_sub(start),
                                child.content.size.min(to.saturating_sub(start)),
                                base + start,
                                f,
                            )?;
                        }
                    }
                }
            }
            pos = end;
        }
        ControlFlow::Continue(())
    }

    fn with_inserted(&self, index: usize, inserted: &[Node]) -> Fragment {
        let mut nodes: Vec<Node> = self.nodes.to_vec();
        nodes.splice(index..index, inserted.iter().cloned());
        Fragment::from_nodes(nodes)
    }

    fn with_replaced(&self, index: usize, node: Node) -> Fragment {
        let mut nodes: Vec<Node> = self.nodes.to_vec();
        nodes[index] = node;
        Fragment::from_nodes(nodes)
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.nodes[..] == other.nodes[..]
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, child) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, ">")
    }
}

/// A node in the document tree. Cloning is cheap; content is shared.
#[derive(Clone)]
pub struct Node {
    node_type: Arc<NodeType>,
    content: Fragment,
    text: Option<Arc<str>>,
}

impl Node {
    pub(crate) fn new(node_type: Arc<NodeType>, content: Fragment) -> Self {
        Self {
            node_type,
            content,
            text: None,
        }
    }

    pub(crate) fn new_text(node_type: Arc<NodeType>, text: &str) -> Self {
        Self {
            node_type,
            content: Fragment::empty(),
            text: Some(Arc::from(text)),
        }
    }

    pub fn node_type(&self) -> &Arc<NodeType> {
        &self.node_type
    }

    pub fn type_name(&self) -> &str {
        self.node_type.name()
    }

    pub fn content(&self) -> &Fragment {
        &self.content
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn node_size(&self) -> usize {
        match &self.text {
            Some(text) => text.chars().count(),
            None if self.is_leaf() => 1,
            None => self.content.size + 2,
        }
    }

    pub fn child_count(&self) -> usize {
        self.content.child_count()
    }

    /// # Panics
    /// Panics when `index` is out of range.
    pub fn child(&self, index: usize) -> &Node {
        self.content.child(index)
    }

    pub fn maybe_child(&self, index: usize) -> Option<&Node> {
        self.content.maybe_child(index)
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.content.first_child()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.content.last_child()
    }

    pub fn is_text(&self) -> bool {
        self.node_type.is_text()
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type.is_leaf()
    }

    pub fn is_atom(&self) -> bool {
        self.node_type.is_atom()
    }

    pub fn is_block(&self) -> bool {
        self.node_type.is_block()
    }

    pub fn is_inline(&self) -> bool {
        self.node_type.is_inline()
    }

    pub fn inline_content(&self) -> bool {
        self.node_type.inline_content()
    }

    pub fn is_textblock(&self) -> bool {
        self.node_type.is_textblock()
    }

    /// Copy of this node with different content.
    pub fn copy(&self, content: Fragment) -> Node {
        Node::new(self.node_type.clone(), content)
    }

    /// Cut this node down to the content between `from` and `to`. For text
    /// nodes the offsets count characters.
    pub fn cut(&self, from: usize, to: usize) -> Node {
        match &self.text {
            Some(text) => {
                if from == 0 && to == self.node_size() {
                    return self.clone();
                }
                let cut: String = text.chars().skip(from).take(to.saturating_sub(from)).collect();
                Node::new_text(self.node_type.clone(), &cut)
            }
            None => {
                if from == 0 && to == self.content.size {
                    return self.clone();
                }
                self.copy(self.content.cut(from, to))
            }
        }
    }

    /// Resolve a position inside this node's content.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos, ModelError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node starting directly at `pos`, if any.
    pub fn node_at(&self, mut pos: usize) -> Option<&Node> {
        let mut node = self;
        loop {
            let (index, offset) = node.content.find_index(pos);
            node = node.maybe_child(index)?;
            if offset == pos || node.is_text() {
                return Some(node);
            }
            pos -= offset + 1;
        }
    }

    /// Depth-first walk over every descendant. The visitor receives the
    /// node and its absolute position.
    pub fn descendants<F>(&self, mut f: F)
    where
        F: FnMut(&Node, usize) -> Visit,
    {
        let _ = self.content.nodes_between(0, self.content.size, 0, &mut f);
    }

    /// Copy of the slice between `from` and `to`.
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, ModelError> {
        if from == to {
            return Ok(Slice::empty());
        }
        let rp_from = self.resolve(from)?;
        let rp_to = self.resolve(to)?;
        let depth = rp_from.shared_depth(to);
        let start = rp_from.start(depth);
        let content = rp_from.node(depth).content.cut(from - start, to - start);
        Ok(Slice {
            content,
            open_start: rp_from.depth() - depth,
            open_end: rp_to.depth() - depth,
        })
    }

    pub(crate) fn with_inserted(&self, index: usize, nodes: &[Node]) -> Node {
        self.copy(self.content.with_inserted(index, nodes))
    }

    pub(crate) fn with_replaced(&self, index: usize, child: Node) -> Node {
        self.copy(self.content.with_replaced(index, child))
    }

    /// JSON form: `{"type": name, "content": [...]}` or `{"type": "text", "text": ...}`.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), json!(self.type_name()));
        if let Some(text) = &self.text {
            obj.insert("text".to_string(), json!(text.as_ref()));
        }
        if self.content.child_count() > 0 {
            obj.insert(
                "content".to_string(),
                Value::Array(self.content.iter().map(Node::to_json).collect()),
            );
        }
        Value::Object(obj)
    }
}

impl Schema {
    /// Build a node from its JSON form.
    pub fn node_from_json(&self, json: &Value) -> Result<Node, ModelError> {
        let obj = json.as_object().ok_or_else(|| ModelError::InvalidJson {
            reason: "node must be an object".to_string(),
        })?;
        let name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::InvalidJson {
                reason: "node is missing a type".to_string(),
            })?;
        let node_type = self.node_type(name)?;

        if node_type.is_text() {
            let text = obj
                .get("text")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ModelError::InvalidJson {
                    reason: "text node needs non-empty text".to_string(),
                })?;
            return Ok(Node::new_text(node_type.clone(), text));
        }

        let children = match obj.get("content") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.node_from_json(item))
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ModelError::InvalidJson {
                    reason: format!("content of {name} must be an array"),
                });
            }
        };
        check_content(node_type, &children)?;
        Ok(node_type.create(children))
    }
}

/// Children must match the kind of content their parent holds; anything
/// else would throw off position counting.
fn check_content(parent: &NodeType, children: &[Node]) -> Result<(), ModelError> {
    let misplaced = match parent.spec().content {
        ContentKind::Empty => children.first(),
        ContentKind::Inline => children.iter().find(|child| !child.is_inline()),
        ContentKind::Block => children.iter().find(|child| child.is_inline()),
    };
    match misplaced {
        Some(child) => Err(ModelError::InvalidJson {
            reason: format!("{} is not allowed in {}", child.type_name(), parent.name()),
        }),
        None => Ok(()),
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.node_type == other.node_type && self.text == other.text && self.content == other.content
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            return write!(f, "{:?}", text.as_ref());
        }
        write!(f, "{}", self.type_name())?;
        if self.content.child_count() > 0 {
            write!(f, "(")?;
            for (i, child) in self.content.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A piece of document cut out between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn empty() -> Self {
        Self {
            content: Fragment::empty(),
            open_start: 0,
            open_end: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{doc, hr, p, schema};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn node_sizes() {
        let d = doc(vec![p("AB"), hr(), p("")]);
        assert_eq!(d.child(0).node_size(), 4);
        assert_eq!(d.child(1).node_size(), 1);
        assert_eq!(d.child(2).node_size(), 2);
        assert_eq!(d.content().size(), 7);
        assert_eq!(d.node_size(), 9);
    }

    #[test]
    fn find_index_rounds_to_child_boundaries() {
        let d = doc(vec![p("A"), hr(), p("B")]);
        assert_eq!(d.content().find_index(0), (0, 0));
        assert_eq!(d.content().find_index(1), (0, 0));
        assert_eq!(d.content().find_index(3), (1, 3));
        assert_eq!(d.content().find_index(4), (2, 4));
        assert_eq!(d.content().find_index(7), (3, 7));
    }

    #[test]
    fn node_at_finds_children_and_text() {
        let d = doc(vec![p("AB"), hr()]);
        assert_eq!(d.node_at(0).map(Node::type_name), Some("paragraph"));
        assert_eq!(d.node_at(1).and_then(Node::text), Some("AB"));
        assert_eq!(d.node_at(4).map(Node::type_name), Some("horizontal_rule"));
        assert!(d.node_at(5).is_none());
    }

    #[test]
    fn descendants_respects_visit_signals() {
        let d = doc(vec![p("A"), hr(), p("B")]);

        let mut seen = Vec::new();
        d.descendants(|node, pos| {
            seen.push(format!("{}@{pos}", node.type_name()));
            Visit::Descend
        });
        assert_eq!(
            seen,
            vec!["paragraph@0", "text@1", "horizontal_rule@3", "paragraph@4", "text@5"]
        );

        let mut skipped = Vec::new();
        d.descendants(|node, pos| {
            skipped.push(format!("{}@{pos}", node.type_name()));
            Visit::SkipChildren
        });
        assert_eq!(skipped, vec!["paragraph@0", "horizontal_rule@3", "paragraph@4"]);

        let mut stopped = Vec::new();
        d.descendants(|node, pos| {
            stopped.push(format!("{}@{pos}", node.type_name()));
            if node.is_atom() { Visit::Stop } else { Visit::Descend }
        });
        assert_eq!(stopped, vec!["paragraph@0", "text@1"]);
    }

    #[test]
    fn slice_cuts_across_blocks() {
        let d = doc(vec![p("Hello"), p("World")]);
        let slice = d.slice(3, 10).unwrap();
        assert_eq!(format!("{:?}", slice.content), "<paragraph(\"llo\"), paragraph(\"Wo\")>");
        assert_eq!(slice.open_start, 1);
        assert_eq!(slice.open_end, 1);
        assert!(d.slice(4, 4).unwrap().is_empty());
    }

    #[test]
    fn json_round_trip() {
        let schema = schema();
        let d = doc(vec![p("A"), hr(), p("B")]);
        let json = d.to_json();
        assert_eq!(
            json,
            json!({
                "type": "doc",
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "A"}]},
                    {"type": "horizontal_rule"},
                    {"type": "paragraph", "content": [{"type": "text", "text": "B"}]},
                ]
            })
        );
        assert_eq!(schema.node_from_json(&json).unwrap(), d);
    }

    #[test]
    fn json_rejects_bad_nodes() {
        let schema = schema();
        assert!(matches!(
            schema.node_from_json(&json!({"type": "nope"})),
            Err(ModelError::UnknownNodeType { .. })
        ));
        assert!(matches!(
            schema.node_from_json(&json!({"type": "doc", "content": 3})),
            Err(ModelError::InvalidJson { .. })
        ));
    }

    #[rstest]
    #[case::missing_text(json!({"type": "text"}), "text node needs non-empty text")]
    #[case::empty_text(json!({"type": "text", "text": ""}), "text node needs non-empty text")]
    #[case::text_in_doc(
        json!({"type": "doc", "content": [{"type": "text", "text": "abcd"}]}),
        "text is not allowed in doc"
    )]
    #[case::children_on_a_leaf(
        json!({"type": "horizontal_rule", "content": [{"type": "paragraph"}]}),
        "paragraph is not allowed in horizontal_rule"
    )]
    #[case::block_in_textblock(
        json!({"type": "paragraph", "content": [{"type": "horizontal_rule"}]}),
        "horizontal_rule is not allowed in paragraph"
    )]
    #[case::nested_text_in_blockquote(
        json!({"type": "doc", "content": [
            {"type": "blockquote", "content": [{"type": "text", "text": "q"}]}
        ]}),
        "text is not allowed in blockquote"
    )]
    fn json_rejects_misplaced_content(#[case] input: Value, #[case] reason: &str) {
        assert_eq!(
            schema().node_from_json(&input),
            Err(ModelError::InvalidJson {
                reason: reason.to_string()
            })
        );
    }
}
