//! Tests for the document tree substrate.

mod common;

use nodegroup::document::DftEvent;
use nodegroup::{Document, InsertAs, NodeData, NodeId, StructureError};
use pretty_assertions::assert_eq;
use rstest::rstest;

use self::common::init_test_setup;

/// Returns the `id` attribute of an element, or the text of a text node.
fn label(doc: &Document, id: NodeId) -> String {
    match doc.data(id) {
        Some(NodeData::Element(element)) => element.attribute("id").unwrap_or_default().to_owned(),
        Some(NodeData::Text(text)) => text.clone(),
        Some(data) => data.to_string(),
        None => "(dead)".to_owned(),
    }
}

/// Creates an element with the `id` attribute.
fn labeled(doc: &mut Document, name: &str) -> NodeId {
    let element = doc.create_element("div");
    doc.set_attribute(element, "id", name)
        .expect("a fresh element accepts attributes");
    element
}

/// Returns the sample tree and its toplevel.
///
/// ```text
/// top
/// |-- 0
/// |   |-- 0-0
/// |   `-- 0-1
/// |       `-- 0-1-0
/// |-- 1
/// `-- 2
///     `-- 2-0
/// ```
fn sample_tree(doc: &mut Document) -> (NodeId, [NodeId; 8]) {
    let names = ["top", "0", "0-0", "0-1", "0-1-0", "1", "2", "2-0"];
    let nodes = names.map(|name| labeled(doc, name));
    let [top, n0, n00, n01, n010, n1, n2, n20] = nodes;
    doc.append(top, [n0, n1, n2]).expect("fresh nodes");
    doc.append(n0, [n00, n01]).expect("fresh nodes");
    doc.append(n01, [n010]).expect("fresh nodes");
    doc.append(n2, [n20]).expect("fresh nodes");
    (top, nodes)
}

fn dft_labels(doc: &Document, top: NodeId) -> Vec<DftEvent<String>> {
    doc.descendants(top)
        .map(|ev| ev.map(|id| label(doc, id)))
        .collect()
}

fn child_labels(doc: &Document, parent: NodeId) -> Vec<String> {
    doc.children(parent).map(|id| label(doc, id)).collect()
}

#[test]
fn dft_forward() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, _) = sample_tree(&mut doc);

    let opened = dft_labels(&doc, top)
        .into_iter()
        .filter_map(|ev| match ev {
            DftEvent::Open(label) => Some(label),
            DftEvent::Close(_) => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(opened, ["top", "0", "0-0", "0-1", "0-1-0", "1", "2", "2-0"]);

    let events = dft_labels(&doc, top);
    assert_eq!(events.first(), Some(&DftEvent::Open("top".to_owned())));
    assert_eq!(events.last(), Some(&DftEvent::Close("top".to_owned())));
    assert_eq!(events.len(), 16);
}

#[test]
fn children_backward() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, _) = sample_tree(&mut doc);
    let reversed = doc
        .children(top)
        .rev()
        .map(|id| label(&doc, id))
        .collect::<Vec<_>>();
    assert_eq!(reversed, ["2", "1", "0"]);
}

#[test]
fn debug_print_sample_tree() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, [_, n0, ..]) = sample_tree(&mut doc);
    doc.append(n0, ["text"]).expect("fresh nodes");

    let printed = doc.debug_print(top).expect("alive").to_string();
    insta::assert_snapshot!(printed, @r###"
    <div id="top">
    |-- <div id="0">
    |   |-- <div id="0-0">
    |   |-- <div id="0-1">
    |   |   `-- <div id="0-1-0">
    |   `-- "text"
    |-- <div id="1">
    `-- <div id="2">
        `-- <div id="2-0">
    "###);
}

/// Moving a node among its siblings.
#[rstest]
#[case::prev_sibling_as_next_sibling(0, InsertAs::NextSiblingOf, 1, ["1", "0", "2"])]
#[case::prev_prev_sibling_as_next_sibling(0, InsertAs::NextSiblingOf, 2, ["1", "2", "0"])]
#[case::next_sibling_as_prev_sibling(1, InsertAs::PreviousSiblingOf, 0, ["1", "0", "2"])]
#[case::next_next_sibling_as_prev_sibling(2, InsertAs::PreviousSiblingOf, 0, ["2", "0", "1"])]
#[case::same_place_after(1, InsertAs::NextSiblingOf, 0, ["0", "1", "2"])]
#[case::same_place_before(1, InsertAs::PreviousSiblingOf, 2, ["0", "1", "2"])]
fn reorder_siblings(
    #[case] moved: usize,
    #[case] dest: fn(NodeId) -> InsertAs,
    #[case] anchor: usize,
    #[case] expected: [&str; 3],
) {
    init_test_setup();
    let mut doc = Document::new();
    let (top, [_, n0, _, _, _, n1, n2, _]) = sample_tree(&mut doc);
    let siblings = [n0, n1, n2];

    doc.insert(siblings[moved], dest(siblings[anchor]))
        .expect("siblings can be reordered");
    assert_eq!(child_labels(&doc, top), expected);
    assert_eq!(
        doc.children(top).rev().collect::<Vec<_>>(),
        doc.children(top).collect::<Vec<_>>().into_iter().rev().collect::<Vec<_>>(),
        "backward links must agree with forward links"
    );
}

#[test]
fn sibling_as_child_moves_it_down() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, [_, n0, _, _, _, n1, _, _]) = sample_tree(&mut doc);

    doc.insert(n0, InsertAs::LastChildOf(n1))
        .expect("a sibling can become a child");
    assert_eq!(child_labels(&doc, top), ["1", "2"]);
    assert_eq!(child_labels(&doc, n1), ["0"]);
}

/// Inserting a node under its own descendant is refused without changes.
#[rstest]
#[case::itself(1)]
#[case::child(3)]
#[case::grandchild(4)]
fn ancestor_as_descendant_child(#[case] target: usize) {
    init_test_setup();
    let mut doc = Document::new();
    let (top, nodes) = sample_tree(&mut doc);
    let n0 = nodes[1];
    let before = doc.debug_print(top).expect("alive").to_string();

    let result = doc.insert(n0, InsertAs::LastChildOf(nodes[target]));
    assert_eq!(result, Err(StructureError::AncestorDescendantLoop));
    assert_eq!(doc.debug_print(top).expect("alive").to_string(), before);
}

#[test]
fn siblings_of_a_root_are_refused() {
    init_test_setup();
    let mut doc = Document::new();
    let lonely = doc.create_element("p");
    let other = doc.create_text("x");
    assert_eq!(
        doc.insert(other, InsertAs::NextSiblingOf(lonely)),
        Err(StructureError::SiblingsWithoutParent)
    );
    assert_eq!(
        doc.insert(lonely, InsertAs::NextSiblingOf(lonely)),
        Err(StructureError::UnorderableSiblings)
    );
}

#[test]
fn removed_nodes_become_free_roots() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, [_, n0, ..]) = sample_tree(&mut doc);
    let root = doc.root();
    doc.append(root, [top]).expect("fresh nodes");
    assert!(doc.is_connected(n0));

    doc.remove(n0).expect("alive");
    assert!(doc.is_alive(n0));
    assert!(!doc.is_connected(n0));
    assert_eq!(doc.parent(n0), None);
    assert_eq!(child_labels(&doc, top), ["1", "2"]);
    assert_eq!(child_labels(&doc, n0), ["0-0", "0-1"]);
}

#[test]
fn replace_children_swaps_everything() {
    init_test_setup();
    let mut doc = Document::new();
    let (top, [_, n0, ..]) = sample_tree(&mut doc);
    doc.replace_children(top, ["a", "b"]).expect("alive");
    assert_eq!(child_labels(&doc, top), ["a", "b"]);
    assert_eq!(doc.parent(n0), None);
}

#[test]
fn attributes_only_on_elements() {
    init_test_setup();
    let mut doc = Document::new();
    let text = doc.create_text("t");
    assert_eq!(
        doc.set_attribute(text, "id", "x"),
        Err(StructureError::NotAnElement(text))
    );
    let element = doc.create_element("p");
    doc.set_attribute(element, "class", "lead").expect("element");
    assert_eq!(doc.attribute(element, "class"), Some("lead"));
}
