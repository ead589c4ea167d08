use crate::error::ModelError;
use crate::mapping::{Mapping, StepMap};
use crate::node::Node;

/// Accumulates document edits together with the mapping they produce.
///
/// Only whole-node insertion at a block boundary is supported; that is
/// every edit the extensions in this workspace perform.
#[derive(Debug, Clone)]
pub struct Transform {
    doc: Node,
    mapping: Mapping,
}

impl Transform {
    pub fn new(doc: Node) -> Self {
        Self {
            doc,
            mapping: Mapping::new(),
        }
    }

    pub fn doc(&self) -> &Node {
        &self.doc
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn doc_changed(&self) -> bool {
        !self.mapping.is_empty()
    }

    /// Insert `nodes` at `pos`, which must sit between two children of a
    /// node that holds block content.
    pub fn insert(&mut self, pos: usize, nodes: Vec<Node>) -> Result<&mut Self, ModelError> {
        let rp = self.doc.resolve(pos)?;
        let parent = rp.parent();
        if parent.inline_content() || parent.is_leaf() {
            return Err(ModelError::InvalidInsert {
                pos,
                reason: format!("{} does not hold block content", parent.type_name()),
            });
        }
        if rp.text_offset() != 0 {
            return Err(ModelError::InvalidInsert {
                pos,
                reason: "position is inside a node".to_string(),
            });
        }
        if let Some(inline) = nodes.iter().find(|n| n.is_inline()) {
            return Err(ModelError::InvalidInsert {
                pos,
                reason: format!("{} is inline", inline.type_name()),
            });
        }

        let size: usize = nodes.iter().map(Node::node_size).sum();
        let depth = rp.depth();
        let mut updated = parent.with_inserted(rp.index(depth), &nodes);
        for d in (0..depth).rev() {
            updated = rp.node(d).with_replaced(rp.index(d), updated);
        }

        self.doc = updated;
        self.mapping.push(StepMap::replace(pos, 0, size));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{blockquote, doc, hr, p, schema};
    use crate::mapping::Mappable;
    use pretty_assertions::assert_eq;

    #[test]
    fn inserts_between_blocks() {
        let mut tr = Transform::new(doc(vec![p("A"), hr(), p("B")]));
        tr.insert(3, vec![p("")]).unwrap();
        assert_eq!(tr.doc().to_string(), "doc(paragraph(\"A\"), paragraph, horizontal_rule, paragraph(\"B\"))");
        assert_eq!(tr.mapping().map(3), 5);
        assert_eq!(tr.mapping().map(2), 2);
        assert!(tr.doc_changed());
    }

    #[test]
    fn inserts_inside_nested_blocks() {
        let mut tr = Transform::new(doc(vec![blockquote(vec![hr()])]));
        tr.insert(2, vec![p("")]).unwrap();
        assert_eq!(tr.doc().to_string(), "doc(blockquote(horizontal_rule, paragraph))");
    }

    #[test]
    fn refuses_inline_targets() {
        let mut tr = Transform::new(doc(vec![p("AB")]));
        assert!(matches!(
            tr.insert(2, vec![hr()]),
            Err(ModelError::InvalidInsert { .. })
        ));
        let text = schema().text("x");
        let mut tr = Transform::new(doc(vec![hr()]));
        assert!(matches!(
            tr.insert(0, vec![text]),
            Err(ModelError::InvalidInsert { .. })
        ));
        assert!(!tr.doc_changed());
    }
}
