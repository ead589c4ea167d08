//! Input bindings that create gap cursors.
//!
//! Handlers follow the host's command convention: they look at the current
//! state and return the transaction to dispatch, or `None` to let the
//! default behaviour run.

use serde::{Deserialize, Serialize};
use weft_model::{
    Decoration, DecorationSet, Dir, EditorState, Selection, TextSelection, Transaction,
};

use crate::error::GapCursorError;
use crate::gap_cursor::{GAP_CURSOR_JSON_ID, GapCursor};

/// Class of the widget drawn where the gap cursor sits.
pub const GAP_CURSOR_CLASS: &str = "ProseMirror-gapcursor";

const COMPOSITION_INPUT: &str = "insertCompositionText";

/// What a click on a gap position does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickPolicy {
    /// Put a gap cursor at the clicked position.
    #[default]
    SelectGap,
    /// Insert an empty textblock at the clicked position and put a text
    /// cursor in it.
    InsertParagraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Direction of an arrow key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn new(axis: Axis, dir: Dir) -> Self {
        match (axis, dir) {
            (Axis::Horizontal, Dir::Back) => Direction::Left,
            (Axis::Horizontal, Dir::Forward) => Direction::Right,
            (Axis::Vertical, Dir::Back) => Direction::Up,
            (Axis::Vertical, Dir::Forward) => Direction::Down,
        }
    }

    /// Parse a DOM key name such as `ArrowLeft`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    pub fn dir(self) -> Dir {
        match self {
            Direction::Left | Direction::Up => Dir::Back,
            Direction::Right | Direction::Down => Dir::Forward,
        }
    }
}

/// What the handlers need from the view beyond the state itself.
pub trait EditorView {
    fn editable(&self) -> bool;

    /// Whether moving the cursor in `direction` would leave the textblock
    /// the selection head is in.
    fn end_of_textblock(&self, state: &EditorState, direction: Direction) -> bool;
}

/// A view without layout. Every textblock is treated as a single line, so
/// vertical motion always leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelView {
    editable: bool,
}

impl ModelView {
    pub fn new(editable: bool) -> Self {
        Self { editable }
    }
}

impl Default for ModelView {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EditorView for ModelView {
    fn editable(&self) -> bool {
        self.editable
    }

    fn end_of_textblock(&self, state: &EditorState, direction: Direction) -> bool {
        let head = state.selection().head_pos();
        let parent = head.parent();
        if !parent.inline_content() {
            return false;
        }
        match direction {
            Direction::Left => head.parent_offset() == 0,
            Direction::Right => head.parent_offset() == parent.content().size(),
            Direction::Up | Direction::Down => true,
        }
    }
}

/// Whether an input event should keep travelling to the host's own handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Result of [`GapCursorPlugin::handle_before_input`].
#[derive(Debug, Clone)]
pub struct BeforeInput {
    pub transaction: Option<Transaction>,
    pub propagation: Propagation,
}

impl BeforeInput {
    fn pass(transaction: Option<Transaction>) -> Self {
        Self {
            transaction,
            propagation: Propagation::Continue,
        }
    }
}

/// Command moving into the nearest gap along `axis` in direction `dir`.
///
/// From a text selection it only fires when the head is at the edge of its
/// textblock, and then searches from just outside that textblock.
pub fn arrow(
    axis: Axis,
    dir: Dir,
) -> impl Fn(&EditorState, &dyn EditorView) -> Option<Transaction> {
    let direction = Direction::new(axis, dir);
    move |state: &EditorState, view: &dyn EditorView| {
        let sel = state.selection();
        let mut start = match dir {
            Dir::Forward => sel.to_pos(),
            Dir::Back => sel.from_pos(),
        }
        .clone();
        let mut must_move = sel.empty();

        if sel.as_text().is_some() {
            if !view.end_of_textblock(state, direction) || start.depth() == 0 {
                return None;
            }
            must_move = false;
            let edge = match dir {
                Dir::Forward => start.after(start.depth()),
                Dir::Back => start.before(start.depth()),
            }?;
            start = state.doc().resolve(edge).ok()?;
        }

        let found = GapCursor::find_from(&start, dir, must_move)?;
        log::debug!("{direction:?} from {} found gap at {}", start.pos(), found.pos());
        let mut tr = state.tr();
        tr.set_selection(GapCursor::new(found).into_selection());
        Some(tr)
    }
}

/// Key, click and input handlers for gap cursors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapCursorPlugin {
    click_policy: ClickPolicy,
}

impl GapCursorPlugin {
    pub fn new(click_policy: ClickPolicy) -> Self {
        Self { click_policy }
    }

    pub fn click_policy(&self) -> ClickPolicy {
        self.click_policy
    }

    /// Arrow keys move into gaps; every other key is declined.
    pub fn handle_key_down(
        &self,
        state: &EditorState,
        view: &dyn EditorView,
        key: &str,
    ) -> Option<Transaction> {
        let direction = Direction::from_key(key)?;
        arrow(direction.axis(), direction.dir())(state, view)
    }

    /// Handle a click at `pos`. Only positions that already are gaps are
    /// handled; there is no search.
    pub fn handle_click(
        &self,
        state: &EditorState,
        view: &dyn EditorView,
        pos: usize,
    ) -> Result<Option<Transaction>, GapCursorError> {
        if !view.editable() {
            return Ok(None);
        }
        let rp = state.doc().resolve(pos)?;
        if !GapCursor::valid(&rp) {
            return Ok(None);
        }

        let mut tr = state.tr();
        let textblock = rp
            .parent()
            .node_type()
            .default_child()
            .filter(|ty| ty.is_textblock())
            .cloned();
        match (self.click_policy, textblock) {
            (ClickPolicy::InsertParagraph, Some(textblock)) => {
                log::debug!("click at {pos}: inserting {}", textblock.name());
                tr.insert(pos, vec![textblock.create_and_fill()])?;
                let cursor = TextSelection::create(tr.doc(), pos + 1, pos + 1)?;
                tr.set_selection(cursor.into());
            }
            // A parent that allows gaps without a default textblock has
            // nothing to insert; select the gap instead.
            _ => {
                log::debug!("click at {pos}: selecting gap");
                tr.set_selection(GapCursor::new(rp).into_selection());
            }
        }
        Ok(Some(tr))
    }

    /// When a composition starts on a gap cursor, give it an empty
    /// textblock to write into. The event itself always propagates.
    pub fn handle_before_input(
        &self,
        state: &EditorState,
        input_type: &str,
    ) -> Result<BeforeInput, GapCursorError> {
        if input_type != COMPOSITION_INPUT {
            return Ok(BeforeInput::pass(None));
        }
        let Some(cursor) = state.selection().as_custom::<GapCursor>() else {
            return Ok(BeforeInput::pass(None));
        };
        let from = cursor.pos();
        let wrapping = from.parent().node_type().find_inline_wrapping();
        let Some((innermost, outer)) = wrapping.as_deref().and_then(<[_]>::split_last) else {
            return Ok(BeforeInput::pass(None));
        };

        let mut node = innermost.create_and_fill();
        for ty in outer.iter().rev() {
            node = ty.create(vec![node]);
        }

        let mut tr = state.tr();
        tr.insert(from.pos(), vec![node])?;
        let inside = tr.doc().resolve(from.pos() + 1)?;
        let selection = Selection::find_from(&inside, Dir::Forward, true)
            .unwrap_or_else(|| Selection::near(&inside, Dir::Forward));
        tr.set_selection(selection);
        Ok(BeforeInput::pass(Some(tr)))
    }

    pub fn decorations(&self, state: &EditorState) -> Option<DecorationSet> {
        draw_gap_cursor(state)
    }
}

/// The caret widget for an active gap cursor.
pub fn draw_gap_cursor(state: &EditorState) -> Option<DecorationSet> {
    let cursor = state.selection().as_custom::<GapCursor>()?;
    let widget =
        Decoration::widget(cursor.pos().pos(), GAP_CURSOR_CLASS).with_key(GAP_CURSOR_JSON_ID);
    Some(DecorationSet::create(state.doc(), vec![widget]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use weft_model::builders::{doc, hr, p};

    #[rstest]
    #[case("ArrowLeft", Some(Direction::Left))]
    #[case("ArrowDown", Some(Direction::Down))]
    #[case("Enter", None)]
    fn key_names(#[case] key: &str, #[case] expected: Option<Direction>) {
        assert_eq!(Direction::from_key(key), expected);
        if let Some(direction) = expected {
            assert_eq!(Direction::new(direction.axis(), direction.dir()), direction);
        }
    }

    #[rstest]
    #[case(1, Direction::Left, true)]
    #[case(1, Direction::Right, false)]
    #[case(3, Direction::Right, true)]
    #[case(2, Direction::Up, true)]
    fn model_view_edges(#[case] head: usize, #[case] direction: Direction, #[case] expected: bool) {
        let d = doc(vec![p("AB")]);
        let state = EditorState::new(
            d.clone(),
            TextSelection::create(&d, head, head).unwrap().into(),
        );
        assert_eq!(ModelView::default().end_of_textblock(&state, direction), expected);
    }

    #[test]
    fn other_keys_and_inputs_are_declined() {
        let state = EditorState::with_doc(doc(vec![hr(), hr()]));
        let plugin = GapCursorPlugin::default();
        assert!(plugin.handle_key_down(&state, &ModelView::default(), "a").is_none());
        let input = plugin.handle_before_input(&state, "insertText").unwrap();
        assert!(input.transaction.is_none());
        assert_eq!(input.propagation, Propagation::Continue);
    }

    #[test]
    fn caret_widget_only_for_gap_cursors() {
        let d = doc(vec![hr(), hr()]);
        let state = EditorState::new(
            d.clone(),
            GapCursor::new(d.resolve(1).unwrap()).into_selection(),
        );
        let set = draw_gap_cursor(&state).unwrap();
        insta::assert_snapshot!(set.to_string(), @r#"widget 1 class="ProseMirror-gapcursor" key="gapcursor""#);

        let text = doc(vec![p("A")]);
        assert!(draw_gap_cursor(&EditorState::with_doc(text)).is_none());
    }
}
