#![forbid(unsafe_code)]

//! Box tiling through a whole view tree.
//!
//! Covers the major-axis cases a box meets in practice: children that are
//! already at their maximum, children squeezed below their minimum, and
//! repeated layout at an unchanged size.

use std::rc::Rc;
use viewtree_core::{Axis, Insets, LayoutConfig, Rect};
use viewtree_doc::{Document, ElementId, TextDocument};
use viewtree_view::{BasicViewFactory, MonospaceMetrics, NewView, ViewFactory, ViewTree};

/// Lays paragraphs out side by side instead of stacked.
struct Columns;

impl ViewFactory for Columns {
    fn create(&self, doc: &dyn Document, element: ElementId) -> NewView {
        if element == doc.default_root() {
            NewView::boxed(Axis::X)
        } else {
            BasicViewFactory.create(doc, element)
        }
    }
}

fn allocations(tree: &ViewTree<TextDocument>, view: viewtree_view::ViewId, alloc: Rect) -> Vec<Rect> {
    let count = tree.view_count(view).expect("count");
    (0..count)
        .map(|i| {
            tree.child_allocation(view, i, Some(alloc))
                .expect("index")
                .expect("laid out")
        })
        .collect()
}

#[test]
fn fixed_children_are_not_stretched() {
    let mut tree = ViewTree::new(
        TextDocument::new("a\nb\nc\nd"),
        MonospaceMetrics::new(8, 10, 8),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    let alloc = Rect::from_size(200, 435);
    tree.layout(root, alloc.width, alloc.height).expect("layout");

    let rects = allocations(&tree, root, alloc);
    let offsets: Vec<i32> = rects.iter().map(|r| r.y).collect();
    let spans: Vec<i32> = rects.iter().map(|r| r.height).collect();
    assert_eq!(offsets, vec![0, 10, 20, 30]);
    assert_eq!(spans, vec![10, 10, 10, 10]);
}

#[test]
fn squeezed_children_keep_their_minimum() {
    let text = format!("{}\n{}\n{}", "a".repeat(200), "b".repeat(186), "c".repeat(200));
    let mut tree = ViewTree::new(
        TextDocument::new(&text),
        MonospaceMetrics::new(1, 16, 12),
        LayoutConfig::default(),
    )
    .with_factory(Rc::new(Columns));
    let root = tree.build_root().expect("root");

    let x = tree.requirements(root, Axis::X).expect("x");
    assert_eq!(x.minimum, 586);

    let alloc = Rect::from_size(586 - 150, 100);
    tree.layout(root, alloc.width, alloc.height).expect("layout");
    let rects = allocations(&tree, root, alloc);
    let offsets: Vec<i32> = rects.iter().map(|r| r.x).collect();
    let spans: Vec<i32> = rects.iter().map(|r| r.width).collect();
    assert_eq!(spans, vec![200, 186, 200]);
    assert_eq!(offsets, vec![0, 200, 386]);
}

#[test]
fn stacked_paragraphs_resize_only_across() {
    let mut tree = ViewTree::new(
        TextDocument::new("one\ntwo"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    tree.layout(root, 100, 100).expect("layout");
    assert_eq!(tree.resize_weight(root, Axis::X), Ok(1));
    assert_eq!(tree.resize_weight(root, Axis::Y), Ok(0));
    assert_eq!(tree.preferred_span(root, Axis::Y), Ok(32));
}

#[test]
fn insets_shift_children_and_grow_requirements() {
    let mut tree = ViewTree::new(
        TextDocument::new("ab\ncd"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    let bare = tree.preferred_span(root, Axis::Y).expect("bare");
    tree.set_insets(root, Insets::new(4, 6, 2, 0)).expect("insets");
    assert_eq!(tree.preferred_span(root, Axis::Y), Ok(bare + 6));

    let alloc = Rect::new(10, 10, 100, 100);
    tree.layout(root, alloc.width, alloc.height).expect("layout");
    let rects = allocations(&tree, root, alloc);
    assert_eq!(rects[0].x, 16);
    assert_eq!(rects[0].y, 14);
    assert_eq!(rects[1].y, 30);
}

#[test]
fn repeated_layout_is_answered_from_cache() {
    let mut tree = ViewTree::new(
        TextDocument::new("hello world\nsecond paragraph"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    );
    let root = tree.build_root().expect("root");
    tree.layout(root, 80, 200).expect("layout");
    let first = tree.stats();

    tree.layout(root, 80, 200).expect("layout");
    let second = tree.stats();
    assert_eq!(second.layouts, first.layouts);
    assert_eq!(second.flow_rebuilds, first.flow_rebuilds);
    assert_eq!(second.skipped, first.skipped + 1);
}

#[test]
fn forced_layout_always_recomputes() {
    let mut tree = ViewTree::new(
        TextDocument::new("hello world"),
        MonospaceMetrics::default(),
        LayoutConfig::default().force_full_layout(true),
    );
    let root = tree.build_root().expect("root");
    tree.layout(root, 80, 200).expect("layout");
    let first = tree.stats();
    tree.layout(root, 80, 200).expect("layout");
    let second = tree.stats();
    assert!(second.layouts > first.layouts);
    assert!(second.flow_rebuilds > first.flow_rebuilds);
}
