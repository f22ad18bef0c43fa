use super::{Anchor, NodeRef, Session};
use crate::breadcrumb::PathComposer;
use crate::document::{Document, NodeId};
use crate::error::OutlineError;
use crate::navigator::{Direction, Navigation};
use crate::strategy::Strategy;
use crate::transaction::Transaction;
use url::Url;

/// `# Intro` holding the paragraph "Welcome".
fn intro() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let intro = doc.add_heading(root, 1, "Intro").unwrap();
    let welcome = doc.add_paragraph(intro, "Welcome");
    (doc, intro, welcome)
}

#[test]
fn test_second_insert_sees_first() {
    let (doc, intro, welcome) = intro();
    let mut session = Session::new(doc);
    let pos = session.document().content_start(welcome).unwrap() + 3;
    assert!(session.set_cursor(pos));

    assert_eq!(session.insert_heading(1), Ok(Strategy::Sibling));
    let root = session.document().root();
    let added = session.document().children(root)[1];
    assert_eq!(session.document().children(root)[0], intro);
    let title = session.document().title_node(added).unwrap();
    assert_eq!(
        Some(session.cursor()),
        session.document().content_start(title)
    );

    assert_eq!(session.insert_heading(2), Ok(Strategy::Child));
    let body = session.document().body_node(added).unwrap();
    assert_eq!(session.document().children(body).len(), 1);
    assert_eq!(session.pending().len(), 2);
}

#[test]
fn test_rejected_insert_leaves_session_unchanged() {
    let (doc, _, _) = intro();
    let mut session = Session::new(doc);
    let revision = session.document().revision();

    assert_eq!(session.insert_heading(0), Err(OutlineError::InvalidLevel(0)));
    assert_eq!(session.document().revision(), revision);
    assert!(session.pending().is_empty());
    assert!(!session.set_cursor(10_000));
}

#[test]
fn test_confirm_drains_pending() {
    let (doc, _, _) = intro();
    let mut session = Session::new(doc);
    session.insert_heading(1).unwrap();

    let confirmed = session.confirm();
    assert_eq!(confirmed.len(), 1);
    assert!(confirmed[0].spec.id.is_some());
    assert!(session.pending().is_empty());
}

#[test]
fn test_rebase_replays_onto_remote_base() {
    let (doc, intro, welcome) = intro();
    let base = doc.clone();
    let mut session = Session::new(doc);
    session.set_cursor(session.document().content_start(welcome).unwrap() + 1);
    session.insert_heading(1).unwrap();
    let id = session.pending()[0].spec.id.clone().unwrap();

    let mut remote = base;
    let mut tx = Transaction::new(&remote);
    let note = tx.create_paragraph("remote note");
    tx.insert_into(remote.root(), 0, vec![note]);
    remote = tx.commit();
    remote.add_paragraph(intro, "remote tail");

    assert_eq!(session.rebase(remote), Ok(1));
    let doc = session.document();
    let replayed = doc.find_by_stable_id(&id).unwrap();
    assert_eq!(doc.children(doc.root()), &[note, intro, replayed]);
    assert_eq!(doc.children(doc.body_node(intro).unwrap()).len(), 2);
    assert_eq!(session.pending().len(), 1);
}

#[test]
fn test_rebase_skips_intents_already_in_base() {
    let (doc, _, _) = intro();
    let mut session = Session::new(doc);
    session.insert_heading(1).unwrap();

    let committed = session.document().clone();
    assert_eq!(session.rebase(committed), Ok(0));
    assert!(session.pending().is_empty());
}

#[test]
fn test_rebase_fails_when_anchor_heading_is_gone() {
    let (doc, intro, welcome) = intro();
    let mut remote = doc.clone();
    let mut session = Session::new(doc);
    session.set_cursor(session.document().content_start(welcome).unwrap());
    session.insert_heading(2).unwrap();

    remote.remove(intro);
    assert!(matches!(
        session.rebase(remote),
        Err(OutlineError::StaleInsertionPoint { .. })
    ));
    assert!(session.pending().is_empty());
}

#[test]
fn test_anchor_follows_structure_across_remote_edits() {
    let (doc, intro, welcome) = intro();
    let title = doc.title_node(intro).unwrap();
    let pos = doc.content_start(title).unwrap() + 2;
    let anchor = Anchor::at(&doc, pos).unwrap();
    assert!(matches!(
        anchor,
        Anchor::Text {
            block: NodeRef::Title(_),
            offset: 2
        }
    ));

    let mut tx = Transaction::new(&doc);
    let note = tx.create_paragraph("pushed down");
    tx.insert_into(doc.root(), 0, vec![note]);
    let mut moved = tx.commit();
    assert_eq!(anchor.locate(&moved), Some(pos + moved.node_size(note)));

    let after_welcome = Anchor::at(&doc, doc.node_end(welcome).unwrap()).unwrap();
    moved.set_title(intro, "Introduction");
    assert_eq!(after_welcome.locate(&moved), moved.node_end(welcome));

    let root_gap = Anchor::at(&moved, 0).unwrap();
    assert_eq!(
        root_gap,
        Anchor::Gap {
            container: NodeRef::Root,
            after: None
        }
    );
}

#[test]
fn test_anchor_is_lost_when_neighbour_moves_away() {
    let (doc, intro, welcome) = intro();
    let anchor = Anchor::at(&doc, doc.node_end(welcome).unwrap()).unwrap();

    let mut remote = doc.clone();
    let mut tx = Transaction::new(&remote);
    let body = remote.body_node(intro).unwrap();
    let run = tx.remove_range(body, 0..1);
    tx.insert_into(remote.root(), 0, run);
    remote = tx.commit();
    assert_eq!(anchor.locate(&remote), None);
}

/// `# A` holding [lead, `### B`], with a split pending at the end of `lead`.
fn pending_split() -> (Document, Session, [NodeId; 3]) {
    let mut doc = Document::new();
    let root = doc.root();
    let a = doc.add_heading(root, 1, "A").unwrap();
    let lead = doc.add_paragraph(a, "lead");
    let b = doc.add_heading(a, 3, "B").unwrap();

    let base = doc.clone();
    let mut session = Session::new(doc);
    assert!(session.set_cursor(session.document().node_end(lead).unwrap() - 1));
    assert_eq!(session.insert_heading(2), Ok(Strategy::Split));
    (base, session, [a, lead, b])
}

fn body_of(doc: &Document, heading: NodeId) -> Vec<NodeId> {
    doc.children(doc.body_node(heading).unwrap()).to_vec()
}

#[test]
fn test_rebase_over_remote_title_edit_keeps_split_boundary() {
    let (mut remote, mut session, [a, lead, b]) = pending_split();
    let id = session.pending()[0].spec.id.clone().unwrap();
    remote.set_title(a, "A much longer title");

    assert_eq!(session.rebase(remote), Ok(1));
    let doc = session.document();
    let d = doc.find_by_stable_id(&id).unwrap();
    assert_eq!(doc.title(a), Some("A much longer title"));
    assert_eq!(body_of(doc, a), vec![lead, d]);
    assert_eq!(body_of(doc, d), vec![b]);
}

#[test]
fn test_rebase_over_earlier_paragraph_in_same_body() {
    let (mut remote, mut session, [a, lead, b]) = pending_split();
    let id = session.pending()[0].spec.id.clone().unwrap();
    let mut tx = Transaction::new(&remote);
    let preface = tx.create_paragraph("remote preface");
    tx.insert_into(remote.body_node(a).unwrap(), 0, vec![preface]);
    remote = tx.commit();

    assert_eq!(session.rebase(remote), Ok(1));
    let doc = session.document();
    let d = doc.find_by_stable_id(&id).unwrap();
    assert_eq!(body_of(doc, a), vec![preface, lead, d]);
    assert_eq!(body_of(doc, d), vec![b]);
}

#[test]
fn test_navigate_moves_cursor_to_gap() {
    let (doc, intro, _) = intro();
    let id = doc.stable_id(intro).cloned().unwrap();
    let end = doc.node_end(intro).unwrap();
    let mut session = Session::new(doc);
    session.set_cursor(2);

    assert_eq!(session.navigate(Direction::Down), Navigation::NoOp);
    session.collapsed_mut().collapse(id);
    assert_eq!(session.navigate(Direction::Down), Navigation::GapCursor(end));
    assert_eq!(session.cursor(), end);
}

#[test]
fn test_breadcrumb_for_cursor() {
    let (doc, _, welcome) = intro();
    let mut session = Session::new(doc);
    session.set_cursor(session.document().content_start(welcome).unwrap());

    let composer = PathComposer::new(Url::parse("https://example.com/").unwrap());
    let path = session.breadcrumb(&composer);
    assert_eq!(path.len(), 1);
    assert_eq!(path.crumbs[0].title, "Intro");
    assert_eq!(session.headings().len(), 1);
}
