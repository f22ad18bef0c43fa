use super::table_of_contents;
use crate::document::Document;

#[test]
fn test_sections_in_document_order_with_tree_links() {
    let mut doc = Document::new();
    let root = doc.root();
    let guide = doc.add_heading(root, 1, "Guide").unwrap();
    doc.add_heading(guide, 2, "Install").unwrap();
    let usage = doc.add_heading(guide, 2, "Usage Notes").unwrap();
    doc.add_heading(usage, 4, "Flags").unwrap();
    doc.add_heading(root, 1, "FAQ").unwrap();

    let toc = table_of_contents(&doc);
    let titles: Vec<&str> = toc.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Guide", "Install", "Usage Notes", "Flags", "FAQ"]);

    assert_eq!(toc[0].parent_index, None);
    assert_eq!(toc[0].children_indices, vec![1, 2]);
    assert_eq!(toc[2].children_indices, vec![3]);
    assert_eq!(toc[3].parent_index, Some(2));
    assert_eq!(toc[4].parent_index, None);
    assert_eq!(toc[2].slug, "usage-notes");
}

#[test]
fn test_depth_and_level_are_reported_separately() {
    let mut doc = Document::new();
    let root = doc.root();
    let top = doc.add_heading(root, 3, "Top").unwrap();
    doc.add_heading(top, 1, "Inner").unwrap();

    let toc = table_of_contents(&doc);
    assert_eq!((toc[0].level, toc[0].depth), (3, 0));
    assert_eq!((toc[1].level, toc[1].depth), (1, 1));
}

#[test]
fn test_bounds_and_detached_headings() {
    let mut doc = Document::new();
    let root = doc.root();
    doc.add_paragraph(root, "preamble");
    let kept = doc.add_heading(root, 1, "Kept").unwrap();
    let dropped = doc.add_heading(root, 1, "Dropped").unwrap();
    doc.remove(dropped);

    let toc = table_of_contents(&doc);
    assert_eq!(toc.len(), 1);
    assert_eq!(toc[0].node, kept);
    assert_eq!(Some(toc[0].start), doc.node_start(kept));
    assert_eq!(Some(toc[0].end), doc.node_end(kept));
    assert_eq!(Some(&toc[0].stable_id), doc.stable_id(kept));
}
