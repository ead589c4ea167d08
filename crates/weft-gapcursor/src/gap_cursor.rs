//! The gap cursor selection.
//!
//! A gap cursor is a zero-width selection at a position where no text caret
//! can go: between two images, before a leading rule, next to an isolating
//! block. Its anchor and head are always the same resolved position.
//!
//! # Validity
//!
//! A position is a gap when its parent is not a textblock, the content on
//! both sides of it is "closed" (ends in a leaf, an atom or an isolating
//! node rather than in inline content), and the parent would naturally hold
//! a textblock there. A node type can force the answer either way with
//! [`NodeSpec::allow_gap_cursor`](weft_model::NodeSpec).
//!
//! # Search
//!
//! [`GapCursor::find_from`] walks outward from a position until it finds a
//! sibling in the search direction, then inward through that sibling's
//! first (or last) children, testing each boundary it crosses. Unselectable
//! atoms are stepped over whole.

use std::any::Any;
use std::sync::Arc;

use serde_json::{Value, json};
use weft_model::{
    CustomSelection, Dir, Mappable, ModelError, Node, NodeSelection, ResolvedPos, Selection,
    SelectionBookmark, SelectionRegistry, Slice,
};

use crate::bookmark::GapBookmark;
use crate::error::GapCursorError;

/// Tag of the gap cursor in the JSON form of a selection.
pub const GAP_CURSOR_JSON_ID: &str = "gapcursor";

/// Node type that always closes the content after a position, whatever its
/// content. Kept for documents authored against editors that special-case
/// quotes this way.
const CLOSED_AFTER_TYPE: &str = "blockquote";

#[derive(Debug, Clone, PartialEq)]
pub struct GapCursor {
    pos: ResolvedPos,
}

impl GapCursor {
    /// A gap cursor at `pos`. Validity is the caller's business.
    pub fn new(pos: ResolvedPos) -> Self {
        Self { pos }
    }

    pub fn pos(&self) -> &ResolvedPos {
        &self.pos
    }

    pub fn into_selection(self) -> Selection {
        Selection::Custom(Arc::new(self))
    }

    /// Whether `pos` can hold a gap cursor.
    pub fn valid(pos: &ResolvedPos) -> bool {
        let parent = pos.parent();
        if parent.is_textblock() || !closed_before(pos) || !closed_after(pos) {
            return false;
        }
        let node_type = parent.node_type();
        if let Some(allow) = node_type.spec().allow_gap_cursor {
            return allow;
        }
        node_type
            .default_child()
            .is_some_and(|child| child.is_textblock())
    }

    /// The nearest gap from `pos` in direction `dir`. With `must_move`
    /// unset, `pos` itself is returned when it is already a gap.
    pub fn find_from(pos: &ResolvedPos, dir: Dir, must_move: bool) -> Option<ResolvedPos> {
        let doc = pos.doc();
        let mut start = pos.clone();
        let mut must_move = must_move;

        'search: loop {
            if !must_move && Self::valid(&start) {
                return Some(start);
            }

            let mut pos = start.pos();
            let mut next = None;
            for d in (0..=start.depth()).rev() {
                let parent = start.node(d);
                next = match dir {
                    Dir::Forward => parent.maybe_child(start.index_after(d)),
                    Dir::Back => start
                        .index(d)
                        .checked_sub(1)
                        .and_then(|i| parent.maybe_child(i)),
                }
                .cloned();
                if next.is_some() || d == 0 {
                    break;
                }
                pos = dir.step(pos, 1)?;
                let cur = doc.resolve(pos).ok()?;
                if Self::valid(&cur) {
                    return Some(cur);
                }
            }
            let mut next = next?;

            loop {
                let inside = match dir {
                    Dir::Forward => next.first_child(),
                    Dir::Back => next.last_child(),
                }
                .cloned();
                let Some(inside) = inside else {
                    if is_skippable_atom(&next) {
                        log::trace!(
                            "gap search stepping over {} at {pos}",
                            next.type_name()
                        );
                        start = doc.resolve(dir.step(pos, next.node_size())?).ok()?;
                        must_move = false;
                        continue 'search;
                    }
                    return None;
                };
                next = inside;
                pos = dir.step(pos, 1)?;
                let cur = doc.resolve(pos).ok()?;
                if Self::valid(&cur) {
                    return Some(cur);
                }
            }
        }
    }

    /// Decode `{"type": "gapcursor", "pos": n}`. The position is resolved
    /// but not re-validated.
    pub fn from_json(doc: &Node, json: &Value) -> Result<Self, GapCursorError> {
        let pos = match json.get("pos") {
            None => {
                return Err(GapCursorError::InvalidJson {
                    reason: "missing pos".to_string(),
                });
            }
            Some(value) => value.as_u64().ok_or_else(|| GapCursorError::InvalidJson {
                reason: format!("pos must be a non-negative integer, got {value}"),
            })?,
        };
        let pos = usize::try_from(pos).map_err(|_| GapCursorError::InvalidJson {
            reason: format!("pos {pos} does not fit a document offset"),
        })?;
        Ok(Self::new(doc.resolve(pos)?))
    }

    /// Make `"gapcursor"` selections decodable through `registry`.
    pub fn register(registry: &mut SelectionRegistry) -> Result<(), ModelError> {
        registry.register(GAP_CURSOR_JSON_ID, |doc, json| {
            Ok(GapCursor::from_json(doc, json)?.into_selection())
        })
    }

    /// Gap cursor at `pos` when valid, otherwise the nearest ordinary selection.
    pub(crate) fn or_near(pos: ResolvedPos) -> Selection {
        if Self::valid(&pos) {
            GapCursor::new(pos).into_selection()
        } else {
            log::debug!("{} is no longer a gap, falling back to nearest selection", pos.pos());
            Selection::near(&pos, Dir::Forward)
        }
    }
}

impl CustomSelection for GapCursor {
    fn json_id(&self) -> &'static str {
        GAP_CURSOR_JSON_ID
    }

    fn anchor(&self) -> &ResolvedPos {
        &self.pos
    }

    fn head(&self) -> &ResolvedPos {
        &self.pos
    }

    fn map(&self, doc: &Node, mapping: &dyn Mappable) -> Result<Selection, ModelError> {
        let pos = doc.resolve(mapping.map(self.pos.pos()))?;
        Ok(Self::or_near(pos))
    }

    fn eq(&self, other: &Selection) -> bool {
        other
            .as_custom::<GapCursor>()
            .is_some_and(|g| g.pos.pos() == self.pos.pos())
    }

    fn content(&self) -> Slice {
        Slice::empty()
    }

    fn to_json(&self) -> Value {
        json!({"type": GAP_CURSOR_JSON_ID, "pos": self.pos.pos()})
    }

    fn visible(&self) -> bool {
        false
    }

    fn bookmark(&self) -> Box<dyn SelectionBookmark> {
        Box::new(GapBookmark::new(self.pos.pos()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn is_skippable_atom(node: &Node) -> bool {
    node.is_atom() && !node.is_text() && !NodeSelection::is_selectable(node)
}

fn is_isolating(node: &Node) -> bool {
    node.node_type().spec().isolating
}

fn closes(node: &Node) -> bool {
    (node.child_count() == 0 && !node.inline_content()) || node.is_atom() || is_isolating(node)
}

fn closed_before(pos: &ResolvedPos) -> bool {
    for d in (0..=pos.depth()).rev() {
        let index = pos.index(d);
        let parent = pos.node(d);
        if index == 0 {
            if is_isolating(parent) {
                return true;
            }
            continue;
        }
        let mut before = parent.child(index - 1);
        loop {
            if closes(before) {
                return true;
            }
            if before.inline_content() {
                return false;
            }
            match before.last_child() {
                Some(last) => before = last,
                None => return true,
            }
        }
    }
    true
}

fn closed_after(pos: &ResolvedPos) -> bool {
    for d in (0..=pos.depth()).rev() {
        let index = pos.index_after(d);
        let parent = pos.node(d);
        if index == parent.child_count() {
            if is_isolating(parent) {
                return true;
            }
            continue;
        }
        let mut after = parent.child(index);
        loop {
            if closes(after) || after.type_name() == CLOSED_AFTER_TYPE {
                return true;
            }
            if after.inline_content() {
                return false;
            }
            match after.first_child() {
                Some(first) => after = first,
                None => return true,
            }
        }
    }
    true
}
