#![forbid(unsafe_code)]

//! Document edits delivered to a laid-out tree.
//!
//! Each test lays out a tree at 200x200, drains the damage left by the
//! first layout, edits the document, and delivers the resulting event to
//! the root.

use viewtree_core::{Axis, Bias, LayoutConfig, Rect};
use viewtree_doc::{Attributes, Document, TextDocument};
use viewtree_view::{BasicViewFactory, DisplayList, MonospaceMetrics, ViewId, ViewTree};

const ALLOC: Rect = Rect::new(0, 0, 200, 200);

fn laid_out(text: &str) -> (ViewTree<TextDocument>, ViewId) {
    let mut tree = ViewTree::new(
        TextDocument::new(text),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    tree.layout(root, ALLOC.width, ALLOC.height).expect("layout");
    let _ = tree.take_damage();
    let _ = tree.take_revalidate();
    (tree, root)
}

fn paragraph_starts(tree: &ViewTree<TextDocument>, root: ViewId) -> Vec<usize> {
    tree.children(root)
        .expect("children")
        .iter()
        .map(|v| tree.start_offset(*v).expect("start"))
        .collect()
}

fn row_ranges(tree: &ViewTree<TextDocument>, root: ViewId, paragraph: usize) -> Vec<(usize, usize)> {
    let flow = tree.child(root, paragraph).expect("flow");
    tree.children(flow)
        .expect("rows")
        .iter()
        .map(|row| tree.range(*row).expect("range"))
        .collect()
}

fn painted(tree: &mut ViewTree<TextDocument>, root: ViewId) -> Vec<String> {
    let mut list = DisplayList::new(ALLOC);
    tree.paint(root, &mut list, ALLOC).expect("paint");
    list.texts().map(str::to_owned).collect()
}

#[test]
fn split_paragraph_repaints_from_the_changed_child_down() {
    let (mut tree, root) = laid_out("ab\ncd\nef");
    let old = tree.child(root, 1).expect("second paragraph");

    let event = tree.document_mut().insert_string(4, "\n123").expect("edit");
    tree.insert_update(root, &event, Some(ALLOC), &BasicViewFactory)
        .expect("update");

    assert!(!tree.is_layout_valid(root, Axis::X).expect("x"));
    assert!(!tree.is_layout_valid(root, Axis::Y).expect("y"));
    // Inside allocation shifted down by the old second paragraph's offset.
    assert_eq!(tree.take_damage(), vec![Rect::new(0, 16, 200, 184)]);
    assert!(tree.take_revalidate());

    assert!(!tree.contains(old));
    assert_eq!(tree.view_count(root), Ok(4));
    assert_eq!(paragraph_starts(&tree, root), vec![0, 3, 5, 10]);

    tree.layout(root, ALLOC.width, ALLOC.height).expect("relayout");
    assert_eq!(painted(&mut tree, root), vec!["ab", "c", "123d", "ef"]);
}

#[test]
fn merged_paragraphs_become_one_view() {
    let (mut tree, root) = laid_out("ab\ncd\nef");
    let event = tree.document_mut().remove(5, 1).expect("edit");
    tree.remove_update(root, &event, Some(ALLOC), &BasicViewFactory)
        .expect("update");

    assert_eq!(paragraph_starts(&tree, root), vec![0, 3]);
    assert_eq!(tree.take_damage(), vec![Rect::new(0, 16, 200, 184)]);
    tree.layout(root, ALLOC.width, ALLOC.height).expect("relayout");
    assert_eq!(painted(&mut tree, root), vec!["ab", "cdef"]);
}

#[test]
fn typing_inside_a_paragraph_keeps_its_views() {
    let (mut tree, root) = laid_out("ab\ncd");
    let before = tree.children(root).expect("children").to_vec();

    let event = tree.document_mut().insert_string(1, "xyz").expect("edit");
    tree.dispatch_update(root, &event, Some(ALLOC), &BasicViewFactory)
        .expect("update");

    assert_eq!(tree.children(root).expect("children"), before.as_slice());
    assert_eq!(tree.take_damage(), vec![Rect::new(0, 0, 200, 16)]);
    tree.layout(root, ALLOC.width, ALLOC.height).expect("relayout");
    assert_eq!(painted(&mut tree, root), vec!["axyzb", "cd"]);
    assert_eq!(paragraph_starts(&tree, root), vec![0, 6]);
}

#[test]
fn typing_past_the_edge_rewraps() {
    let (mut tree, root) = laid_out("hello");
    let flow = tree.child(root, 0).expect("flow");
    assert_eq!(tree.view_count(flow), Ok(1));

    let tail = " ".to_owned() + &"w".repeat(24);
    let event = tree.document_mut().insert_string(5, &tail).expect("edit");
    tree.insert_update(root, &event, Some(ALLOC), &BasicViewFactory)
        .expect("update");
    tree.layout(root, ALLOC.width, ALLOC.height).expect("relayout");
    assert_eq!(tree.view_count(flow), Ok(2));
    let rect = tree
        .child_allocation(root, 0, Some(ALLOC))
        .expect("index")
        .expect("flow");
    assert_eq!(rect.height, 32);
}

#[test]
fn attribute_change_leaves_earlier_paragraphs_alone() {
    let (mut tree, root) = laid_out("ab\ncd\nef");
    let attributes = Attributes::new().with("bold", true);
    let event = tree
        .document_mut()
        .set_run_attributes(4, 1, &attributes)
        .expect("edit");
    tree.changed_update(root, &event, Some(ALLOC), &BasicViewFactory)
        .expect("update");

    let damage = tree.take_damage();
    assert!(!damage.is_empty());
    assert!(damage.iter().all(|r| r.y >= 16), "damage: {damage:?}");
    assert!(damage.contains(&Rect::new(0, 16, 200, 16)));
}

#[test]
fn without_allocation_nothing_is_repainted() {
    let (mut tree, root) = laid_out("ab\ncd");
    let event = tree.document_mut().insert_string(1, "\n").expect("edit");
    tree.insert_update(root, &event, None, &BasicViewFactory)
        .expect("update");
    assert!(tree.take_damage().is_empty());
    assert!(tree.take_revalidate());
    assert_eq!(tree.view_count(root), Ok(3));
}

#[test]
fn edits_stay_consistent_with_the_document() {
    let (mut tree, root) = laid_out("one two\nthree");
    let edits: [(bool, usize, &str, usize); 4] = [
        (true, 3, "\n", 0),
        (false, 0, "", 2),
        (true, 9, " four", 0),
        (false, 3, "", 1),
    ];
    for (insert, offset, text, length) in edits {
        let event = if insert {
            tree.document_mut().insert_string(offset, text)
        } else {
            tree.document_mut().remove(offset, length)
        }
        .expect("edit");
        tree.dispatch_update(root, &event, Some(ALLOC), &BasicViewFactory)
            .expect("update");
        tree.layout(root, ALLOC.width, ALLOC.height).expect("relayout");

        let doc = tree.document();
        let expected: Vec<usize> = (0..doc.child_count(doc.default_root()))
            .filter_map(|i| doc.child(doc.default_root(), i))
            .map(|p| doc.start_offset(p))
            .collect();
        assert_eq!(paragraph_starts(&tree, root), expected);
        let content = tree.document().content();
        let painted = painted(&mut tree, root).concat();
        assert_eq!(painted, content.replace('\n', ""));
    }
}

#[test]
fn edits_shift_the_rows_of_later_paragraphs() {
    // Five cells: both paragraphs wrap after their first word.
    let alloc = Rect::from_size(40, 200);
    let mut tree = ViewTree::new(
        TextDocument::new("aaaa bbbb\ncccc dddd"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    tree.layout(root, alloc.width, alloc.height).expect("layout");
    assert_eq!(row_ranges(&tree, root, 1), vec![(10, 15), (15, 20)]);

    let event = tree.document_mut().insert_string(0, "x").expect("edit");
    tree.dispatch_update(root, &event, Some(alloc), &BasicViewFactory)
        .expect("update");
    tree.layout(root, alloc.width, alloc.height).expect("relayout");
    assert_eq!(row_ranges(&tree, root, 1), vec![(11, 16), (16, 21)]);
    let caret = tree
        .model_to_view(root, 20, Some(alloc), Some(Bias::Forward))
        .expect("caret");
    assert_eq!((caret.x, caret.y), (32, 48));

    // A split in the first paragraph moves the last one again.
    let event = tree.document_mut().insert_string(1, "\n").expect("split");
    tree.dispatch_update(root, &event, Some(alloc), &BasicViewFactory)
        .expect("update");
    tree.layout(root, alloc.width, alloc.height).expect("relayout");
    assert_eq!(tree.view_count(root), Ok(3));
    assert_eq!(row_ranges(&tree, root, 2), vec![(12, 17), (17, 22)]);

    let event = tree.document_mut().remove(0, 2).expect("merge");
    tree.dispatch_update(root, &event, Some(alloc), &BasicViewFactory)
        .expect("update");
    tree.layout(root, alloc.width, alloc.height).expect("relayout");
    assert_eq!(row_ranges(&tree, root, 1), vec![(10, 15), (15, 20)]);
}
