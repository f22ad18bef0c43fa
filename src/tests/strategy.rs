use super::{body_boundary, decide, next_sibling_heading, Boundary, Strategy};
use crate::classify::{classify, HeadingRef};
use crate::document::{Document, NodeId, StableId};
use crate::position::resolve;

fn heading(level: u8) -> HeadingRef {
    HeadingRef {
        node: NodeId(0),
        level,
        title: String::new(),
        stable_id: StableId::from("h"),
        container_start: 0,
        container_end: 0,
    }
}

#[test]
fn test_no_enclosing_heading_is_sibling() {
    for level in 1..=6 {
        assert_eq!(decide(None, None, level), Strategy::Sibling);
    }
}

#[test]
fn test_same_or_higher_rank_is_sibling() {
    let current = heading(3);
    assert_eq!(decide(Some(&current), None, 3), Strategy::Sibling);
    assert_eq!(decide(Some(&current), None, 1), Strategy::Sibling);
    assert_eq!(
        decide(Some(&current), Some(&heading(6)), 2),
        Strategy::Sibling
    );
}

#[test]
fn test_deeper_rank_without_deeper_follower_is_child() {
    let current = heading(1);
    assert_eq!(decide(Some(&current), None, 2), Strategy::Child);
    assert_eq!(decide(Some(&current), Some(&heading(2)), 2), Strategy::Child);
    assert_eq!(decide(Some(&current), Some(&heading(2)), 3), Strategy::Child);
}

#[test]
fn test_deeper_follower_forces_split() {
    let current = heading(1);
    assert_eq!(decide(Some(&current), Some(&heading(3)), 2), Strategy::Split);
    assert_eq!(decide(Some(&current), Some(&heading(6)), 5), Strategy::Split);
}

#[test]
fn test_strategy_serializes_screaming() {
    assert_eq!(
        serde_json::to_string(&Strategy::Split).unwrap(),
        "\"SPLIT\""
    );
}

/// `# A` with body [P "hello", ### B, P "tail"].
fn fixture() -> (Document, NodeId, NodeId, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let a = doc.add_heading(root, 1, "A").unwrap();
    let hello = doc.add_paragraph(a, "hello");
    let b = doc.add_heading(a, 3, "B").unwrap();
    doc.add_paragraph(a, "tail");
    (doc, a, hello, b)
}

fn boundary_at(doc: &Document, pos: usize) -> Option<Boundary> {
    let resolved = resolve(doc, pos).unwrap();
    let headings = classify(doc, &resolved.chain);
    let outer = headings.first().unwrap();
    body_boundary(doc, &resolved, outer)
}

#[test]
fn test_body_boundary_positions() {
    let (doc, a, hello, b) = fixture();
    let title = doc.title_node(a).unwrap();
    let text = doc.content_start(hello).unwrap();

    assert_eq!(
        boundary_at(&doc, doc.content_start(title).unwrap()),
        Some(Boundary::Between(0))
    );
    assert_eq!(
        boundary_at(&doc, doc.node_start(hello).unwrap()),
        Some(Boundary::Between(0))
    );
    assert_eq!(boundary_at(&doc, text), Some(Boundary::Between(0)));
    assert_eq!(boundary_at(&doc, text + 2), Some(Boundary::Inside(0)));
    assert_eq!(boundary_at(&doc, text + 5), Some(Boundary::Between(1)));
    assert_eq!(
        boundary_at(&doc, doc.node_start(b).unwrap()),
        Some(Boundary::Between(1))
    );
    assert_eq!(Boundary::Inside(0).scan_from(), 1);
    assert_eq!(Boundary::Between(1).scan_from(), 1);
}

#[test]
fn test_next_sibling_heading_follows_boundary() {
    let (doc, a, hello, b) = fixture();
    let text = doc.content_start(hello).unwrap();

    let resolved = resolve(&doc, text + 2).unwrap();
    let current = classify(&doc, &resolved.chain).pop().unwrap();
    assert_eq!(current.node, a);
    let next = next_sibling_heading(&doc, &resolved, &current).unwrap();
    assert_eq!(next.node, b);
    assert_eq!(next.level, 3);

    let past = resolve(&doc, doc.node_end(b).unwrap()).unwrap();
    assert!(next_sibling_heading(&doc, &past, &current).is_none());
}
