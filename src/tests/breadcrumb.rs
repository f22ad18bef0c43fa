use super::{resolve_link, slugify, DisplayCrumb, PathComposer, HINT_PARAM, ID_PARAM};
use crate::classify::{classify, HeadingRef};
use crate::document::{Document, NodeId};
use crate::position::resolve;
use url::Url;

fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Guide > Install > Linux > Debian, returning the document and the innermost heading.
fn deep_document() -> (Document, NodeId) {
    let mut doc = Document::new();
    let root = doc.root();
    let guide = doc.add_heading(root, 1, "Guide").unwrap();
    let install = doc.add_heading(guide, 2, "Install").unwrap();
    let linux = doc.add_heading(install, 3, "Linux").unwrap();
    let debian = doc.add_heading(linux, 4, "Debian").unwrap();
    (doc, debian)
}

fn chain_at_title(doc: &Document, heading: NodeId) -> Vec<HeadingRef> {
    let title = doc.title_node(heading).unwrap();
    let resolved = resolve(doc, doc.content_start(title).unwrap()).unwrap();
    classify(doc, &resolved.chain)
}

fn composer() -> PathComposer {
    PathComposer::new(Url::parse("https://example.com/doc?tab=outline").unwrap())
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("Hello, World!"), "hello-world");
    assert_eq!(slugify("  Leading   spaces "), "leading-spaces");
    assert_eq!(slugify("snake_case - and dash"), "snakecase-and-dash");
    assert_eq!(slugify("Version 2.0"), "version-20");
    assert_eq!(slugify("???"), "");
}

#[test]
fn test_slugify_transliterates_accents() {
    assert_eq!(slugify("Café Über"), "cafe-uber");
    assert_eq!(slugify("Straße"), "strasse");
    assert_eq!(slugify("Crème brûlée, naïve"), "creme-brulee-naive");
}

#[test]
fn test_accented_titles_keep_full_path_hint() {
    let mut doc = Document::new();
    let root = doc.root();
    let cafe = doc.add_heading(root, 1, "Café").unwrap();
    let menu = doc.add_heading(cafe, 2, "Menü").unwrap();

    let path = composer().compose(&chain_at_title(&doc, menu));
    assert_eq!(path.crumbs[0].slug, "cafe");
    assert_eq!(path.crumbs[1].path_hint, "cafe>");
    assert_eq!(path.crumbs[1].slug, "menu");
}

#[test]
fn test_path_hints_use_preceding_ancestors_only() {
    let (doc, debian) = deep_document();
    let path = composer().compose(&chain_at_title(&doc, debian));

    let hints: Vec<&str> = path.crumbs.iter().map(|c| c.path_hint.as_str()).collect();
    assert_eq!(hints, vec!["", "guide>", "guide>install>", "guide>install>linux>"]);
    assert_eq!(path.current().unwrap().slug, "debian");
}

#[test]
fn test_links_carry_hint_and_id() {
    let (doc, debian) = deep_document();
    let path = composer().compose(&chain_at_title(&doc, debian));
    let crumb = path.current().unwrap();

    assert_eq!(query(&crumb.url, "tab").as_deref(), Some("outline"));
    assert_eq!(
        query(&crumb.url, HINT_PARAM).as_deref(),
        Some("guide>install>linux>")
    );
    assert_eq!(
        query(&crumb.url, ID_PARAM).as_deref(),
        Some(crumb.stable_id.as_str())
    );
    assert!(crumb.url.as_str().contains("h=guide%3Einstall%3Elinux%3E"));
    assert_eq!(crumb.url.path(), "/doc");
}

#[test]
fn test_existing_hint_and_id_are_replaced() {
    let (doc, debian) = deep_document();
    let composer =
        PathComposer::new(Url::parse("https://example.com/doc?id=old&h=stale").unwrap());
    let path = composer.compose(&chain_at_title(&doc, debian));
    let url = &path.crumbs[0].url;

    assert_eq!(url.query_pairs().filter(|(k, _)| k == ID_PARAM).count(), 1);
    assert_eq!(query(url, HINT_PARAM).as_deref(), Some(""));
}

#[test]
fn test_custom_separator() {
    let (doc, debian) = deep_document();
    let path = composer()
        .with_separator("/")
        .compose(&chain_at_title(&doc, debian));
    assert_eq!(path.crumbs[2].path_hint, "guide/install/");
}

#[test]
fn test_four_deep_chain_shows_three_entries() {
    let (doc, debian) = deep_document();
    let composer = composer();
    let path = composer.compose(&chain_at_title(&doc, debian));
    assert_eq!(path.len(), 4);

    let shown = composer.display(&path);
    assert_eq!(shown.len(), 3);
    assert_eq!(shown[0], DisplayCrumb::Link(&path.crumbs[0]));
    assert_eq!(shown[1], DisplayCrumb::Ellipsis);
    assert_eq!(shown[2], DisplayCrumb::Link(&path.crumbs[3]));
}

#[test]
fn test_short_chains_are_shown_in_full() {
    let (doc, debian) = deep_document();
    let linux = doc.parent(doc.parent(debian).unwrap()).unwrap();
    let composer = composer();
    let path = composer.compose(&chain_at_title(&doc, linux));
    assert_eq!(path.len(), 3);
    assert!(composer
        .display(&path)
        .iter()
        .all(|crumb| matches!(crumb, DisplayCrumb::Link(_))));

    let two = composer.compose(&chain_at_title(&doc, linux)[..2]);
    assert_eq!(two.truncated(0).len(), 2);
}

#[test]
fn test_root_position_has_empty_path() {
    let mut doc = Document::new();
    let root = doc.root();
    let paragraph = doc.add_paragraph(root, "preamble");
    let resolved = resolve(&doc, doc.content_start(paragraph).unwrap()).unwrap();

    let path = composer().compose(&classify(&doc, &resolved.chain));
    assert!(path.is_empty());
    assert!(path.current().is_none());
    assert!(composer().display(&path).is_empty());
}

#[test]
fn test_ellipsis_serializes_without_link() {
    let json = serde_json::to_value(DisplayCrumb::Ellipsis).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "ellipsis" }));
}

#[test]
fn test_resolve_link_uses_id_only() {
    let (mut doc, debian) = deep_document();
    let path = composer().compose(&chain_at_title(&doc, debian));
    let mut url = path.current().unwrap().url.clone();

    doc.set_title(debian, "Renamed");
    assert_eq!(resolve_link(&doc, &url), Some(debian));

    let id = query(&url, ID_PARAM).unwrap();
    url.query_pairs_mut()
        .clear()
        .append_pair(HINT_PARAM, "nonsense>")
        .append_pair(ID_PARAM, &id);
    assert_eq!(resolve_link(&doc, &url), Some(debian));

    doc.remove(debian);
    assert_eq!(resolve_link(&doc, &url), None);

    let bare = Url::parse("https://example.com/doc?h=guide%3E").unwrap();
    assert_eq!(resolve_link(&doc, &bare), None);
}
