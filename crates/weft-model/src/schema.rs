//! Node types and their capability flags.
//!
//! A full content-expression language is out of scope; each type instead
//! declares what kind of content it holds and which child type fills it by
//! default. That is all the gap cursor and the decoration extensions ask of
//! a schema.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ModelError;
use crate::node::{Fragment, Node};

/// What a node type may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// No content at all (leaf nodes: rules, images, text).
    #[default]
    Empty,
    /// Text and other inline nodes.
    Inline,
    /// Block nodes.
    Block,
}

/// Capability flags of a node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub content: ContentKind,
    /// Whether the node itself is inline (text is).
    pub inline: bool,
    /// Treated as a single unit even when it has content.
    pub atom: bool,
    /// Content boundary that gap search and closed-before/after checks do not cross.
    pub isolating: bool,
    pub selectable: bool,
    /// Explicit gap cursor validity override for positions directly inside this node.
    pub allow_gap_cursor: Option<bool>,
    /// Type filled in by default anywhere in this node's content.
    pub default_child: Option<String>,
    /// `create_and_fill` must add one default child.
    pub requires_content: bool,
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            content: ContentKind::Empty,
            inline: false,
            atom: false,
            isolating: false,
            selectable: true,
            allow_gap_cursor: None,
            default_child: None,
            requires_content: false,
        }
    }
}

impl NodeSpec {
    /// A block leaf such as a horizontal rule.
    pub fn leaf() -> Self {
        Self::default()
    }

    /// A block holding inline content (paragraph, heading).
    pub fn textblock() -> Self {
        Self {
            content: ContentKind::Inline,
            ..Self::default()
        }
    }

    /// A block holding other blocks, filled with `default_child` by default.
    pub fn container(default_child: impl Into<String>) -> Self {
        Self {
            content: ContentKind::Block,
            default_child: Some(default_child.into()),
            requires_content: true,
            ..Self::default()
        }
    }

    /// An inline leaf such as text or an inline image.
    pub fn inline_leaf() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }

    pub fn atom(mut self) -> Self {
        self.atom = true;
        self
    }

    pub fn isolating(mut self) -> Self {
        self.isolating = true;
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn allow_gap_cursor(mut self, allow: bool) -> Self {
        self.allow_gap_cursor = Some(allow);
        self
    }

    pub fn optional_content(mut self) -> Self {
        self.requires_content = false;
        self
    }
}

/// A named node type. Shared between every node of that type.
pub struct NodeType {
    name: String,
    spec: NodeSpec,
    default_child: Option<Arc<NodeType>>,
}

impl NodeType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    pub fn is_text(&self) -> bool {
        self.name == TEXT_TYPE
    }

    pub fn is_inline(&self) -> bool {
        self.spec.inline
    }

    pub fn is_block(&self) -> bool {
        !self.spec.inline
    }

    pub fn is_leaf(&self) -> bool {
        self.spec.content == ContentKind::Empty
    }

    pub fn is_atom(&self) -> bool {
        self.is_leaf() || self.spec.atom
    }

    pub fn inline_content(&self) -> bool {
        self.spec.content == ContentKind::Inline
    }

    pub fn is_textblock(&self) -> bool {
        self.is_block() && self.inline_content()
    }

    /// The type that fills this node's content by default, if any.
    pub fn default_child(&self) -> Option<&Arc<NodeType>> {
        self.default_child.as_ref()
    }

    /// Create a node of this type with the given children.
    pub fn create(self: &Arc<Self>, children: Vec<Node>) -> Node {
        Node::new(self.clone(), Fragment::from_nodes(children))
    }

    /// Create a node of this type, adding the default child (recursively
    /// filled) when the type requires content.
    pub fn create_and_fill(self: &Arc<Self>) -> Node {
        let children = match (&self.default_child, self.spec.requires_content) {
            (Some(child), true) => vec![child.create_and_fill()],
            _ => Vec::new(),
        };
        self.create(children)
    }

    /// Chain of default types, starting below this one, that leads to a
    /// node able to hold inline content. Empty when this type already
    /// holds inline content; `None` when no such chain exists.
    pub fn find_inline_wrapping(&self) -> Option<Vec<Arc<NodeType>>> {
        if self.inline_content() {
            return Some(Vec::new());
        }
        let mut wrapping = Vec::new();
        let mut current = self.default_child.clone();
        while let Some(ty) = current {
            wrapping.push(ty.clone());
            if ty.inline_content() {
                return Some(wrapping);
            }
            current = ty.default_child.clone();
        }
        None
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish()
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeType {}

pub const TEXT_TYPE: &str = "text";

/// A set of node types with a designated top node.
#[derive(Debug, Clone)]
pub struct Schema {
    types: BTreeMap<String, Arc<NodeType>>,
    top: Arc<NodeType>,
}

impl Schema {
    /// Build a schema. Default-child chains must terminate; a cycle is
    /// rejected since filling such a type would never finish.
    pub fn new<N: Into<String>>(
        top: &str,
        specs: impl IntoIterator<Item = (N, NodeSpec)>,
    ) -> Result<Self, ModelError> {
        let specs: BTreeMap<String, NodeSpec> =
            specs.into_iter().map(|(n, s)| (n.into(), s)).collect();

        let mut types = BTreeMap::new();
        for name in specs.keys() {
            build_type(name, &specs, &mut types, &mut Vec::new())?;
        }

        if !types.contains_key(TEXT_TYPE) {
            return Err(ModelError::InvalidSchema {
                reason: "schema has no text type".to_string(),
            });
        }
        let top = types
            .get(top)
            .cloned()
            .ok_or_else(|| ModelError::UnknownNodeType {
                name: top.to_string(),
            })?;

        Ok(Self { types, top })
    }

    /// A small block schema: paragraphs, headings, blockquotes, rules,
    /// images and an isolating figure.
    pub fn basic() -> Self {
        let specs = [
            ("doc", NodeSpec::container("paragraph")),
            ("paragraph", NodeSpec::textblock()),
            ("heading", NodeSpec::textblock()),
            ("blockquote", NodeSpec::container("paragraph")),
            ("figure", NodeSpec::container("paragraph").isolating()),
            ("horizontal_rule", NodeSpec::leaf()),
            ("image", NodeSpec::leaf()),
            (TEXT_TYPE, NodeSpec::inline_leaf()),
        ];
        match Self::new("doc", specs) {
            Ok(schema) => schema,
            Err(e) => unreachable!("basic schema is well formed: {e}"),
        }
    }

    pub fn top_node_type(&self) -> &Arc<NodeType> {
        &self.top
    }

    pub fn node_type(&self, name: &str) -> Result<&Arc<NodeType>, ModelError> {
        self.types
            .get(name)
            .ok_or_else(|| ModelError::UnknownNodeType {
                name: name.to_string(),
            })
    }

    /// Create a node by type name.
    pub fn node(&self, name: &str, children: Vec<Node>) -> Result<Node, ModelError> {
        Ok(self.node_type(name)?.create(children))
    }

    /// Create a text node. Text must not be empty.
    pub fn text(&self, text: &str) -> Node {
        debug_assert!(!text.is_empty(), "empty text nodes are not allowed");
        Node::new_text(self.types[TEXT_TYPE].clone(), text)
    }
}

fn build_type(
    name: &str,
    specs: &BTreeMap<String, NodeSpec>,
    built: &mut BTreeMap<String, Arc<NodeType>>,
    visiting: &mut Vec<String>,
) -> Result<Arc<NodeType>, ModelError> {
    if let Some(ty) = built.get(name) {
        return Ok(ty.clone());
    }
    let spec = specs.get(name).ok_or_else(|| ModelError::UnknownNodeType {
        name: name.to_string(),
    })?;
    if visiting.iter().any(|v| v == name) {
        return Err(ModelError::InvalidSchema {
            reason: format!("default child cycle through {name}"),
        });
    }

    visiting.push(name.to_string());
    let default_child = match &spec.default_child {
        Some(child) => Some(build_type(child, specs, built, visiting)?),
        None => None,
    };
    visiting.pop();

    let ty = Arc::new(NodeType {
        name: name.to_string(),
        spec: spec.clone(),
        default_child,
    });
    built.insert(name.to_string(), ty.clone());
    Ok(ty)
}
