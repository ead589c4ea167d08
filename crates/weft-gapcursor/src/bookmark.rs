use weft_model::{Mappable, ModelError, Node, Selection, SelectionBookmark};

use crate::gap_cursor::GapCursor;

/// Offset-only snapshot of a gap cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapBookmark {
    pos: usize,
}

impl GapBookmark {
    pub fn new(pos: usize) -> Self {
        Self { pos }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }
}

impl SelectionBookmark for GapBookmark {
    fn map(&self, mapping: &dyn Mappable) -> Box<dyn SelectionBookmark> {
        Box::new(GapBookmark::new(mapping.map(self.pos)))
    }

    /// A gap cursor when the stored offset is still a gap in `doc`, the
    /// nearest selection otherwise. Offsets past the end of `doc` are
    /// clamped to it.
    fn resolve(&self, doc: &Node) -> Result<Selection, ModelError> {
        let pos = doc.resolve(self.pos.min(doc.content().size()))?;
        Ok(GapCursor::or_near(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_model::builders::{doc, hr, p};
    use weft_model::{Mapping, StepMap};

    #[test]
    fn map_is_plain_offset_mapping() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 3));
        mapping.push(StepMap::replace(10, 0, 1));
        let bookmark = GapBookmark::new(1).map(&mapping);
        let d = doc(vec![p("X"), hr(), hr()]);
        let sel = bookmark.resolve(&d).unwrap();
        assert_eq!(sel.head(), 4);
        assert!(sel.as_custom::<GapCursor>().is_some());
    }

    #[test]
    fn resolve_falls_back_and_clamps() {
        let d = doc(vec![p("A"), hr()]);
        let sel = GapBookmark::new(3).resolve(&d).unwrap();
        assert!(sel.as_custom::<GapCursor>().is_none());

        let sel = GapBookmark::new(40).resolve(&doc(vec![hr(), hr()])).unwrap();
        assert_eq!(sel.head(), 2);
        assert!(sel.as_custom::<GapCursor>().is_some());
    }
}
