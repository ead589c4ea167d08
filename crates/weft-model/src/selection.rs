//! Selections.
//!
//! The editor holds exactly one selection at a time. Selections are
//! immutable values: every edit produces a new one through [`Selection::map`].
//!
//! Built-in variants cover text ranges, a single selected node and the
//! whole document. Everything else plugs in through [`CustomSelection`]
//! and is decoded by the type tag registered in a [`SelectionRegistry`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::ModelError;
use crate::mapping::Mappable;
use crate::node::{Fragment, Node, Slice};
use crate::resolved::ResolvedPos;

/// Search direction through the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Back,
    Forward,
}

impl Dir {
    pub fn reverse(self) -> Self {
        match self {
            Dir::Back => Dir::Forward,
            Dir::Forward => Dir::Back,
        }
    }

    /// Move `pos` by `by` units in this direction.
    pub fn step(self, pos: usize, by: usize) -> Option<usize> {
        match self {
            Dir::Back => pos.checked_sub(by),
            Dir::Forward => pos.checked_add(by),
        }
    }
}

/// Extension point for selection types defined outside this crate.
pub trait CustomSelection: fmt::Debug {
    /// Tag used in the JSON form and in the [`SelectionRegistry`].
    fn json_id(&self) -> &'static str;

    fn anchor(&self) -> &ResolvedPos;

    fn head(&self) -> &ResolvedPos;

    /// Map this selection into `doc`, the document after an edit described by `mapping`.
    fn map(&self, doc: &Node, mapping: &dyn Mappable) -> Result<Selection, ModelError>;

    fn eq(&self, other: &Selection) -> bool;

    fn content(&self) -> Slice;

    fn to_json(&self) -> Value;

    /// Whether the host should draw its native caret for this selection.
    fn visible(&self) -> bool {
        true
    }

    fn bookmark(&self) -> Box<dyn SelectionBookmark>;

    fn as_any(&self) -> &dyn Any;
}

/// A position-only snapshot of a selection that survives edits without
/// holding on to a document.
pub trait SelectionBookmark: fmt::Debug {
    fn map(&self, mapping: &dyn Mappable) -> Box<dyn SelectionBookmark>;

    fn resolve(&self, doc: &Node) -> Result<Selection, ModelError>;
}

/// A text range; both ends sit in nodes with inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSelection {
    anchor: ResolvedPos,
    head: ResolvedPos,
}

impl TextSelection {
    pub fn new(anchor: ResolvedPos, head: ResolvedPos) -> Self {
        Self { anchor, head }
    }

    pub fn create(doc: &Node, anchor: usize, head: usize) -> Result<Self, ModelError> {
        let head_pos = doc.resolve(head)?;
        let anchor_pos = if anchor == head {
            head_pos.clone()
        } else {
            doc.resolve(anchor)?
        };
        Ok(Self::new(anchor_pos, head_pos))
    }

    pub fn anchor(&self) -> &ResolvedPos {
        &self.anchor
    }

    pub fn head(&self) -> &ResolvedPos {
        &self.head
    }
}

/// A single selected node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSelection {
    anchor: ResolvedPos,
    head: ResolvedPos,
    node: Node,
}

impl NodeSelection {
    /// Select the node directly after `pos`.
    pub fn create(doc: &Node, pos: usize) -> Result<Self, ModelError> {
        let anchor = doc.resolve(pos)?;
        let node = anchor
            .node_after()
            .ok_or(ModelError::NothingToSelect { pos })?;
        let head = doc.resolve(pos + node.node_size())?;
        Ok(Self { anchor, head, node })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Whether a node can be the target of a node selection.
    pub fn is_selectable(node: &Node) -> bool {
        !node.is_text() && node.node_type().spec().selectable
    }
}

/// The whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct AllSelection {
    anchor: ResolvedPos,
    head: ResolvedPos,
}

impl AllSelection {
    pub fn new(doc: &Node) -> Self {
        let start = doc.resolve(0);
        let end = doc.resolve(doc.content().size());
        match (start, end) {
            (Ok(anchor), Ok(head)) => Self { anchor, head },
            _ => unreachable!("document bounds always resolve"),
        }
    }
}

/// The editor's current selection.
#[derive(Debug, Clone)]
pub enum Selection {
    Text(TextSelection),
    Node(NodeSelection),
    All(AllSelection),
    Custom(Arc<dyn CustomSelection>),
}

impl Selection {
    pub fn anchor_pos(&self) -> &ResolvedPos {
        match self {
            Selection::Text(s) => &s.anchor,
            Selection::Node(s) => &s.anchor,
            Selection::All(s) => &s.anchor,
            Selection::Custom(s) => s.anchor(),
        }
    }

    pub fn head_pos(&self) -> &ResolvedPos {
        match self {
            Selection::Text(s) => &s.head,
            Selection::Node(s) => &s.head,
            Selection::All(s) => &s.head,
            Selection::Custom(s) => s.head(),
        }
    }

    pub fn anchor(&self) -> usize {
        self.anchor_pos().pos()
    }

    pub fn head(&self) -> usize {
        self.head_pos().pos()
    }

    /// The lower end of the selection.
    pub fn from_pos(&self) -> &ResolvedPos {
        if self.anchor() <= self.head() {
            self.anchor_pos()
        } else {
            self.head_pos()
        }
    }

    /// The upper end of the selection.
    pub fn to_pos(&self) -> &ResolvedPos {
        if self.anchor() <= self.head() {
            self.head_pos()
        } else {
            self.anchor_pos()
        }
    }

    pub fn from(&self) -> usize {
        self.from_pos().pos()
    }

    pub fn to(&self) -> usize {
        self.to_pos().pos()
    }

    pub fn empty(&self) -> bool {
        self.from() == self.to()
    }

    pub fn visible(&self) -> bool {
        match self {
            Selection::Custom(s) => s.visible(),
            _ => true,
        }
    }

    pub fn as_text(&self) -> Option<&TextSelection> {
        match self {
            Selection::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Downcast a custom selection to its concrete type.
    pub fn as_custom<T: 'static>(&self) -> Option<&T> {
        match self {
            Selection::Custom(s) => s.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Map this selection into `doc`, the document after an edit described by `mapping`.
    pub fn map(&self, doc: &Node, mapping: &dyn Mappable) -> Result<Selection, ModelError> {
        match self {
            Selection::Text(s) => {
                let head = doc.resolve(mapping.map(s.head.pos()))?;
                if !head.parent().inline_content() {
                    return Ok(Selection::near(&head, Dir::Forward));
                }
                let anchor = doc.resolve(mapping.map(s.anchor.pos()))?;
                let anchor = if anchor.parent().inline_content() {
                    anchor
                } else {
                    head.clone()
                };
                Ok(Selection::Text(TextSelection::new(anchor, head)))
            }
            Selection::Node(s) => {
                let pos = doc.resolve(mapping.map(s.anchor.pos()))?;
                match pos.node_after() {
                    Some(node) if NodeSelection::is_selectable(&node) => {
                        Ok(Selection::Node(NodeSelection::create(doc, pos.pos())?))
                    }
                    _ => Ok(Selection::near(&pos, Dir::Forward)),
                }
            }
            Selection::All(_) => Ok(Selection::All(AllSelection::new(doc))),
            Selection::Custom(s) => s.map(doc, mapping),
        }
    }

    /// The content covered by this selection.
    pub fn content(&self) -> Result<Slice, ModelError> {
        match self {
            Selection::Text(_) => self.head_pos().doc().slice(self.from(), self.to()),
            Selection::Node(s) => Ok(Slice {
                content: Fragment::from_nodes(vec![s.node.clone()]),
                open_start: 0,
                open_end: 0,
            }),
            Selection::All(s) => Ok(Slice {
                content: s.anchor.doc().content().clone(),
                open_start: 0,
                open_end: 0,
            }),
            Selection::Custom(s) => Ok(s.content()),
        }
    }

    pub fn eq(&self, other: &Selection) -> bool {
        match (self, other) {
            (Selection::Text(a), Selection::Text(b)) => {
                a.anchor.pos() == b.anchor.pos() && a.head.pos() == b.head.pos()
            }
            (Selection::Node(a), Selection::Node(b)) => a.anchor.pos() == b.anchor.pos(),
            (Selection::All(_), Selection::All(_)) => true,
            (Selection::Custom(a), _) => a.eq(other),
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Selection::Text(s) => {
                json!({"type": "text", "anchor": s.anchor.pos(), "head": s.head.pos()})
            }
            Selection::Node(s) => json!({"type": "node", "anchor": s.anchor.pos()}),
            Selection::All(_) => json!({"type": "all"}),
            Selection::Custom(s) => s.to_json(),
        }
    }

    pub fn bookmark(&self) -> Box<dyn SelectionBookmark> {
        match self {
            Selection::Text(s) => Box::new(TextBookmark {
                anchor: s.anchor.pos(),
                head: s.head.pos(),
            }),
            Selection::Node(s) => Box::new(NodeBookmark {
                anchor: s.anchor.pos(),
            }),
            Selection::All(_) => Box::new(AllBookmark),
            Selection::Custom(s) => s.bookmark(),
        }
    }

    /// The first selection found from `pos` in direction `dir`, looking
    /// outward through ancestors when the parent has nothing to offer.
    pub fn find_from(pos: &ResolvedPos, dir: Dir, text_only: bool) -> Option<Selection> {
        if pos.parent().inline_content() {
            return Some(Selection::Text(TextSelection::new(pos.clone(), pos.clone())));
        }
        let doc = pos.doc();
        if let Some(found) = find_selection_in(
            doc,
            pos.parent(),
            pos.pos(),
            pos.index(pos.depth()),
            dir,
            text_only,
        ) {
            return Some(found);
        }
        for depth in (0..pos.depth()).rev() {
            let found = match dir {
                Dir::Back => find_selection_in(
                    doc,
                    pos.node(depth),
                    pos.before(depth + 1)?,
                    pos.index(depth),
                    dir,
                    text_only,
                ),
                Dir::Forward => find_selection_in(
                    doc,
                    pos.node(depth),
                    pos.after(depth + 1)?,
                    pos.index(depth) + 1,
                    dir,
                    text_only,
                ),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// A valid selection near `pos`, preferring direction `bias`. Falls
    /// back to selecting the whole document.
    pub fn near(pos: &ResolvedPos, bias: Dir) -> Selection {
        Selection::find_from(pos, bias, false)
            .or_else(|| Selection::find_from(pos, bias.reverse(), false))
            .unwrap_or_else(|| Selection::All(AllSelection::new(pos.doc())))
    }

    /// The first selectable position in the document.
    pub fn at_start(doc: &Node) -> Selection {
        find_selection_in(doc, doc, 0, 0, Dir::Forward, false)
            .unwrap_or_else(|| Selection::All(AllSelection::new(doc)))
    }
}

impl From<TextSelection> for Selection {
    fn from(s: TextSelection) -> Self {
        Selection::Text(s)
    }
}

impl From<NodeSelection> for Selection {
    fn from(s: NodeSelection) -> Self {
        Selection::Node(s)
    }
}

impl From<AllSelection> for Selection {
    fn from(s: AllSelection) -> Self {
        Selection::All(s)
    }
}

fn find_selection_in(
    doc: &Node,
    node: &Node,
    pos: usize,
    index: usize,
    dir: Dir,
    text_only: bool,
) -> Option<Selection> {
    if node.inline_content() {
        return TextSelection::create(doc, pos, pos).ok().map(Selection::Text);
    }

    let indices: Box<dyn Iterator<Item = usize>> = match dir {
        Dir::Forward => Box::new(index..node.child_count()),
        Dir::Back => Box::new((0..index.min(node.child_count())).rev()),
    };

    let mut pos = pos;
    for i in indices {
        let child = node.child(i);
        if !child.is_atom() {
            let inner_start = dir.step(pos, 1)?;
            let inner_index = match dir {
                Dir::Forward => 0,
                Dir::Back => child.child_count(),
            };
            if let Some(found) =
                find_selection_in(doc, child, inner_start, inner_index, dir, text_only)
            {
                return Some(found);
            }
        } else if !text_only && NodeSelection::is_selectable(child) {
            let at = match dir {
                Dir::Forward => pos,
                Dir::Back => pos.checked_sub(child.node_size())?,
            };
            return NodeSelection::create(doc, at).ok().map(Selection::Node);
        }
        pos = dir.step(pos, child.node_size())?;
    }
    None
}

#[derive(Debug)]
struct TextBookmark {
    anchor: usize,
    head: usize,
}

impl SelectionBookmark for TextBookmark {
    fn map(&self, mapping: &dyn Mappable) -> Box<dyn SelectionBookmark> {
        Box::new(TextBookmark {
            anchor: mapping.map(self.anchor),
            head: mapping.map(self.head),
        })
    }

    fn resolve(&self, doc: &Node) -> Result<Selection, ModelError> {
        let head = doc.resolve(self.head)?;
        let anchor = doc.resolve(self.anchor)?;
        if head.parent().inline_content() && anchor.parent().inline_content() {
            Ok(Selection::Text(TextSelection::new(anchor, head)))
        } else {
            Ok(Selection::near(&head, Dir::Forward))
        }
    }
}

#[derive(Debug)]
struct NodeBookmark {
    anchor: usize,
}

impl SelectionBookmark for NodeBookmark {
    fn map(&self, mapping: &dyn Mappable) -> Box<dyn SelectionBookmark> {
        Box::new(NodeBookmark {
            anchor: mapping.map(self.anchor),
        })
    }

    fn resolve(&self, doc: &Node) -> Result<Selection, ModelError> {
        let pos = doc.resolve(self.anchor)?;
        match pos.node_after() {
            Some(node) if NodeSelection::is_selectable(&node) => {
                Ok(Selection::Node(NodeSelection::create(doc, self.anchor)?))
            }
            _ => Ok(Selection::near(&pos, Dir::Forward)),
        }
    }
}

#[derive(Debug)]
struct AllBookmark;

impl SelectionBookmark for AllBookmark {
    fn map(&self, _mapping: &dyn Mappable) -> Box<dyn SelectionBookmark> {
        Box::new(AllBookmark)
    }

    fn resolve(&self, doc: &Node) -> Result<Selection, ModelError> {
        Ok(Selection::All(AllSelection::new(doc)))
    }
}

/// Decodes the JSON form of one selection type.
pub type SelectionDecoder = fn(&Node, &Value) -> Result<Selection, ModelError>;

/// Selection types by JSON tag.
#[derive(Debug, Clone)]
pub struct SelectionRegistry {
    decoders: BTreeMap<String, SelectionDecoder>,
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        let mut decoders: BTreeMap<String, SelectionDecoder> = BTreeMap::new();
        decoders.insert("text".to_string(), text_from_json);
        decoders.insert("node".to_string(), node_from_json);
        decoders.insert("all".to_string(), |doc, _| Ok(Selection::All(AllSelection::new(doc))));
        Self { decoders }
    }
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: &str, decoder: SelectionDecoder) -> Result<(), ModelError> {
        if self.decoders.contains_key(id) {
            return Err(ModelError::DuplicateSelectionId { id: id.to_string() });
        }
        self.decoders.insert(id.to_string(), decoder);
        Ok(())
    }

    /// Decode a selection from its JSON form.
    pub fn from_json(&self, doc: &Node, json: &Value) -> Result<Selection, ModelError> {
        let id = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::InvalidJson {
                reason: "selection is missing a type".to_string(),
            })?;
        let decoder = self
            .decoders
            .get(id)
            .ok_or_else(|| ModelError::UnknownSelectionType { id: id.to_string() })?;
        decoder(doc, json)
    }
}

fn json_offset(json: &Value, key: &str) -> Result<usize, ModelError> {
    json.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| ModelError::InvalidJson {
            reason: format!("selection {key} must be a non-negative integer"),
        })
}

fn text_from_json(doc: &Node, json: &Value) -> Result<Selection, ModelError> {
    let anchor = json_offset(json, "anchor")?;
    let head = json_offset(json, "head")?;
    Ok(Selection::Text(TextSelection::create(doc, anchor, head)?))
}

fn node_from_json(doc: &Node, json: &Value) -> Result<Selection, ModelError> {
    let anchor = json_offset(json, "anchor")?;
    Ok(Selection::Node(NodeSelection::create(doc, anchor)?))
}
