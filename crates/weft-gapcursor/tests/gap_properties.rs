use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use weft_gapcursor::{GapBookmark, GapCursor};
use weft_model::builders::{blockquote, doc, figure, h, hr, img, p};
use weft_model::{
    Dir, Mapping, Node, NodeSpec, Schema, Selection, SelectionBookmark, SelectionRegistry, StepMap,
};

fn samples() -> Vec<Node> {
    vec![
        doc(vec![p("A"), hr(), p("B")]),
        doc(vec![hr(), img(), hr()]),
        doc(vec![blockquote(vec![p("quote"), hr()]), h("Title")]),
        doc(vec![figure(vec![img(), p("caption")]), hr()]),
        doc(vec![blockquote(vec![blockquote(vec![hr()])]), img()]),
    ]
}

/// Schema whose images can't be node-selected.
fn inert_image_schema() -> Schema {
    Schema::new(
        "doc",
        [
            ("doc", NodeSpec::container("paragraph")),
            ("paragraph", NodeSpec::textblock()),
            ("image", NodeSpec::leaf().unselectable()),
            ("horizontal_rule", NodeSpec::leaf()),
            ("text", NodeSpec::inline_leaf()),
        ],
    )
    .unwrap()
}

#[test]
fn textblock_parents_are_never_gaps() {
    for d in samples() {
        for pos in 0..=d.content().size() {
            let rp = d.resolve(pos).unwrap();
            if rp.parent().is_textblock() {
                assert!(!GapCursor::valid(&rp), "{d} at {pos}");
            }
        }
    }
}

#[test]
fn validity_and_search_are_deterministic() {
    for d in samples() {
        for pos in 0..=d.content().size() {
            let rp = d.resolve(pos).unwrap();
            assert_eq!(GapCursor::valid(&rp), GapCursor::valid(&rp));
            for dir in [Dir::Back, Dir::Forward] {
                for must_move in [false, true] {
                    let first = GapCursor::find_from(&rp, dir, must_move);
                    let second = GapCursor::find_from(&rp, dir, must_move);
                    assert_eq!(first, second, "{d} from {pos} {dir:?}");
                }
            }
        }
    }
}

#[test]
fn found_positions_are_valid_and_in_direction() {
    for d in samples() {
        for pos in 0..=d.content().size() {
            let rp = d.resolve(pos).unwrap();
            if let Some(found) = GapCursor::find_from(&rp, Dir::Forward, true) {
                assert!(GapCursor::valid(&found));
                assert!(found.pos() > pos, "{d}: {pos} -> {}", found.pos());
            }
            if let Some(found) = GapCursor::find_from(&rp, Dir::Back, true) {
                assert!(GapCursor::valid(&found));
                assert!(found.pos() < pos, "{d}: {pos} -> {}", found.pos());
            }
        }
    }
}

#[test]
fn json_round_trip_through_registry() {
    let mut registry = SelectionRegistry::new();
    GapCursor::register(&mut registry).unwrap();
    assert!(GapCursor::register(&mut registry).is_err());

    let d = doc(vec![hr(), img(), hr()]);
    for pos in 0..=d.content().size() {
        let sel = GapCursor::new(d.resolve(pos).unwrap()).into_selection();
        let json = sel.to_json();
        assert_eq!(json, json!({"type": "gapcursor", "pos": pos}));
        let back = registry.from_json(&d, &json).unwrap();
        assert_eq!(back.head(), sel.head());
        assert!(sel.eq(&back));
    }
}

#[test]
fn registry_reports_bad_gap_json() {
    let mut registry = SelectionRegistry::new();
    GapCursor::register(&mut registry).unwrap();
    let d = doc(vec![hr()]);
    let err = registry
        .from_json(&d, &json!({"type": "gapcursor", "pos": "one"}))
        .unwrap_err();
    assert!(err.to_string().contains("Invalid input for GapCursor::from_json"));
}

#[test]
fn identity_mapping_keeps_an_equal_cursor() {
    let d = doc(vec![hr(), blockquote(vec![hr()]), img()]);
    for pos in 0..=d.content().size() {
        let rp = d.resolve(pos).unwrap();
        if !GapCursor::valid(&rp) {
            continue;
        }
        let sel = GapCursor::new(rp).into_selection();
        assert!(sel.eq(&sel.map(&d, &StepMap::empty()).unwrap()));
        assert!(sel.eq(&sel.map(&d, &Mapping::new()).unwrap()));
    }
}

#[test]
fn mapping_moves_the_cursor_past_inserted_content() {
    let d = doc(vec![hr(), hr()]);
    let sel = GapCursor::new(d.resolve(1).unwrap()).into_selection();
    let after = doc(vec![hr(), img(), hr()]);
    let mapped = sel.map(&after, &StepMap::replace(1, 0, 1)).unwrap();
    assert!(mapped.as_custom::<GapCursor>().is_some());
    assert_eq!(mapped.head(), 2);
}

#[test]
fn bookmark_snapshots_the_position() {
    let d = doc(vec![hr(), hr()]);
    let sel = GapCursor::new(d.resolve(2).unwrap()).into_selection();
    let restored = sel.bookmark().resolve(&d).unwrap();
    assert!(sel.eq(&restored));

    let moved = GapBookmark::new(2).map(&StepMap::replace(0, 0, 3));
    let after = doc(vec![p("X"), hr(), hr()]);
    assert_eq!(moved.resolve(&after).unwrap().head(), 5);
}

#[test]
fn unselectable_atom_is_stepped_over() {
    let schema = inert_image_schema();
    let para = |text: &str| schema.node("paragraph", vec![schema.text(text)]).unwrap();
    let image = schema.node("image", vec![]).unwrap();
    let rule = schema.node("horizontal_rule", vec![]).unwrap();

    // [paragraph][image][paragraph]: nothing to land on, and never inside the image.
    let d = schema
        .node("doc", vec![para("A"), image.clone(), para("B")])
        .unwrap();
    let end_of_a = d.resolve(2).unwrap();
    let found = GapCursor::find_from(&end_of_a, Dir::Forward, false);
    assert_eq!(found, None);

    // [paragraph][image][rule]: the image is skipped whole and the gap after it found.
    let d = schema.node("doc", vec![para("A"), image, rule]).unwrap();
    let end_of_a = d.resolve(2).unwrap();
    let found = GapCursor::find_from(&end_of_a, Dir::Forward, false).unwrap();
    assert_eq!(found.pos(), 4);
}

#[test]
fn selectable_atom_ends_the_search() {
    let d = doc(vec![p("A"), img(), hr()]);
    let end_of_a = d.resolve(2).unwrap();
    assert_eq!(GapCursor::find_from(&end_of_a, Dir::Forward, false), None);
}

#[rstest]
#[case::before(0)]
#[case::after(11)]
fn isolating_node_has_gaps_on_both_sides(#[case] pos: usize) {
    let d = doc(vec![figure(vec![p("caption")])]);
    assert!(GapCursor::valid(&d.resolve(pos).unwrap()));
}

#[test]
fn search_out_of_an_isolating_node_stops_at_its_edge() {
    // hr(0..1) figure(1..6) hr(6..7)
    let d = doc(vec![hr(), figure(vec![p("A")]), hr()]);

    let end_of_a = d.resolve(4).unwrap();
    let found = GapCursor::find_from(&end_of_a, Dir::Forward, false).unwrap();
    assert_eq!(found.pos(), 6);

    let start_of_a = d.resolve(3).unwrap();
    let found = GapCursor::find_from(&start_of_a, Dir::Back, false).unwrap();
    assert_eq!(found.pos(), 1);
}

#[test]
fn search_fails_at_the_document_edge() {
    let d = doc(vec![p("A")]);
    for pos in 0..=d.content().size() {
        let rp = d.resolve(pos).unwrap();
        assert_eq!(GapCursor::find_from(&rp, Dir::Forward, true), None);
        assert_eq!(GapCursor::find_from(&rp, Dir::Back, true), None);
    }
}

#[test]
fn fallback_after_mapping_is_an_ordinary_selection() {
    let d = doc(vec![hr(), hr()]);
    let sel = GapCursor::new(d.resolve(2).unwrap()).into_selection();
    let after = doc(vec![hr(), hr(), p("")]);
    let mapped = sel.map(&after, &StepMap::replace(2, 0, 2)).unwrap();
    assert!(matches!(mapped, Selection::Text(_)));
    assert_eq!(mapped.head(), 3);
}
