#![forbid(unsafe_code)]

//! Flow views: rows built from the layout pool, and when they are rebuilt.

use std::cell::Cell;
use std::rc::Rc;
use viewtree_core::{Axis, Insets, LayoutConfig, Rect, Result};
use viewtree_doc::{Document, ElementId, PARAGRAPH_NAME, TextDocument};
use viewtree_layout::INFINITE;
use viewtree_view::{
    BasicViewFactory, FlowHost, FlowStrategy, MonospaceMetrics, NewView, TextFlowStrategy,
    ViewFactory, ViewId, ViewTree, ViewType,
};

// ── Helpers ─────────────────────────────────────────────────────────────

/// Wraps the text strategy and counts row rebuilds.
struct Counting {
    calls: Rc<Cell<usize>>,
}

impl FlowStrategy for Counting {
    fn layout(&self, host: &mut dyn FlowHost, flow: ViewId) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        TextFlowStrategy.layout(host, flow)
    }
}

struct CountingFactory {
    calls: Rc<Cell<usize>>,
}

impl ViewFactory for CountingFactory {
    fn create(&self, doc: &dyn Document, element: ElementId) -> NewView {
        if doc.name(element) == PARAGRAPH_NAME {
            NewView::flow().with_strategy(Box::new(Counting {
                calls: Rc::clone(&self.calls),
            }))
        } else {
            BasicViewFactory.create(doc, element)
        }
    }
}

/// Builds rows once and leaves them alone on later rebuilds.
struct KeepRows;

impl FlowStrategy for KeepRows {
    fn layout(&self, host: &mut dyn FlowHost, flow: ViewId) -> Result<()> {
        if host.row_count(flow)? == 0 {
            TextFlowStrategy.layout(host, flow)
        } else {
            Ok(())
        }
    }
}

struct KeepRowsFactory;

impl ViewFactory for KeepRowsFactory {
    fn create(&self, doc: &dyn Document, element: ElementId) -> NewView {
        if doc.name(element) == PARAGRAPH_NAME {
            NewView::flow().with_strategy(Box::new(KeepRows))
        } else {
            BasicViewFactory.create(doc, element)
        }
    }
}

fn tree_with(text: &str, config: LayoutConfig) -> (ViewTree<TextDocument>, ViewId) {
    let mut tree = ViewTree::new(TextDocument::new(text), MonospaceMetrics::default(), config);
    let root = tree.build_root().expect("root");
    (tree, root)
}

fn row_ranges(tree: &ViewTree<TextDocument>, flow: ViewId) -> Vec<(usize, usize)> {
    tree.children(flow)
        .expect("rows")
        .iter()
        .map(|row| {
            (
                tree.start_offset(*row).expect("start"),
                tree.end_offset(*row).expect("end"),
            )
        })
        .collect()
}

// ── Requirements before layout ──────────────────────────────────────────

#[test]
fn unlaid_flow_reports_pool_width_and_no_height() {
    let (mut tree, root) = tree_with("hello world", LayoutConfig::default());
    let flow = tree.child(root, 0).expect("flow");
    assert_eq!(tree.view_count(flow), Ok(0));

    let y = tree.requirements(flow, Axis::Y).expect("y");
    assert_eq!((y.minimum, y.maximum), (0, 0));

    let pool = tree.pool(flow).expect("pool").expect("loaded");
    let pool_x = tree.requirements(pool, Axis::X).expect("pool x");
    let x = tree.requirements(flow, Axis::X).expect("x");
    assert_eq!(x.preferred, pool_x.preferred);
    assert_eq!(x.preferred, 88);
    assert_eq!(x.minimum, 40);
    assert_eq!(x.maximum, INFINITE);
}

// ── Row building ────────────────────────────────────────────────────────

#[test]
fn narrow_width_wraps_every_word() {
    let (mut tree, root) = tree_with("aa bb cc dd", LayoutConfig::default());
    tree.layout(root, 24, 400).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    assert_eq!(row_ranges(&tree, flow), vec![(0, 3), (3, 6), (6, 9), (9, 12)]);
    assert_eq!(tree.preferred_span(flow, Axis::Y), Ok(64));
    for row in tree.children(flow).expect("rows") {
        assert_eq!(tree.view_type(*row), Ok(ViewType::Row));
    }
}

#[test]
fn widening_merges_rows() {
    let (mut tree, root) = tree_with("aa bb cc dd", LayoutConfig::default());
    let flow = tree.child(root, 0).expect("flow");
    tree.layout(root, 24, 400).expect("layout");
    assert_eq!(tree.view_count(flow), Ok(4));
    tree.layout(root, 48, 400).expect("layout");
    assert_eq!(row_ranges(&tree, flow), vec![(0, 6), (6, 12)]);
    // The parent saw the height change and re-tiled.
    let alloc = Rect::from_size(48, 400);
    let rect = tree
        .child_allocation(root, 0, Some(alloc))
        .expect("index")
        .expect("laid out");
    assert_eq!(rect.height, 32);
}

#[test]
fn rows_cover_the_paragraph_without_gaps() {
    let text = "the quick brown fox jumps over the lazy dog";
    let (mut tree, root) = tree_with(text, LayoutConfig::default());
    tree.layout(root, 80, 1000).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    let ranges = row_ranges(&tree, flow);
    assert!(ranges.len() > 1);
    assert_eq!(ranges.first().map(|r| r.0), Some(0));
    assert_eq!(ranges.last().map(|r| r.1), Some(text.len() + 1));
    for pair in ranges.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
}

#[test]
fn row_insets_reduce_the_flow_span() {
    let config = LayoutConfig::default().row_insets(Insets::new(0, 8, 0, 16));
    let (mut tree, root) = tree_with("aa bb cc", config);
    tree.layout(root, 48, 400).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    // 24px left for content per row.
    assert_eq!(row_ranges(&tree, flow), vec![(0, 3), (3, 6), (6, 9)]);
    let alloc = Rect::from_size(48, 400);
    let flow_alloc = tree
        .child_allocation(root, 0, Some(alloc))
        .expect("index")
        .expect("flow");
    let row_alloc = tree
        .child_allocation(flow, 0, Some(flow_alloc))
        .expect("index")
        .expect("row");
    let row = tree.child(flow, 0).expect("row");
    let glyph = tree
        .child_allocation(row, 0, Some(row_alloc))
        .expect("index")
        .expect("glyph");
    assert_eq!(glyph.x, 8);
}

#[test]
fn first_line_indent_applies_once() {
    let config = LayoutConfig::default().first_line_indent(16);
    let (mut tree, root) = tree_with("aaaa bbbb", config);
    tree.layout(root, 48, 400).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    // 32px on the first row: "aaaa" fits, the space after it does not.
    assert_eq!(row_ranges(&tree, flow), vec![(0, 4), (4, 10)]);
    let rows = tree.children(flow).expect("rows").to_vec();
    assert_eq!(tree.insets(rows[0]).map(|i| i.left), Ok(16));
    assert_eq!(tree.insets(rows[1]).map(|i| i.left), Ok(0));
}

#[test]
fn factory_indent_overrides_config() {
    struct Indented;
    impl ViewFactory for Indented {
        fn create(&self, doc: &dyn Document, element: ElementId) -> NewView {
            if doc.name(element) == PARAGRAPH_NAME {
                NewView::flow().with_first_line_indent(8)
            } else {
                BasicViewFactory.create(doc, element)
            }
        }
    }

    let mut tree = ViewTree::new(
        TextDocument::new("ab"),
        MonospaceMetrics::default(),
        LayoutConfig::default().first_line_indent(40),
    )
    .with_factory(Rc::new(Indented));
    let root = tree.build_root().expect("root");
    tree.layout(root, 100, 100).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    let row = tree.child(flow, 0).expect("row");
    assert_eq!(tree.insets(row).map(|i| i.left), Ok(8));
}

// ── Rebuild policy ──────────────────────────────────────────────────────

#[test]
fn custom_strategy_runs_once_per_width() {
    let calls = Rc::new(Cell::new(0));
    let mut tree = ViewTree::new(
        TextDocument::new("hello world\nagain"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    )
    .with_factory(Rc::new(CountingFactory {
        calls: Rc::clone(&calls),
    }));
    let root = tree.build_root().expect("root");
    assert_eq!(calls.get(), 0, "loading does not build rows");

    tree.layout(root, 48, 200).expect("layout");
    assert_eq!(calls.get(), 2);
    tree.layout(root, 48, 200).expect("layout");
    tree.layout(root, 48, 200).expect("layout");
    assert_eq!(calls.get(), 2);

    tree.layout(root, 96, 200).expect("layout");
    assert_eq!(calls.get(), 4);
}

#[test]
fn height_change_alone_keeps_rows() {
    let (mut tree, root) = tree_with("hello world", LayoutConfig::default());
    tree.layout(root, 48, 200).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    let rows = tree.children(flow).expect("rows").to_vec();
    let rebuilds = tree.stats().flow_rebuilds;

    tree.layout(root, 48, 300).expect("layout");
    assert_eq!(tree.stats().flow_rebuilds, rebuilds);
    assert_eq!(tree.children(flow).expect("rows"), rows.as_slice());
}

#[test]
fn rebuild_places_rows_again_even_if_untouched() {
    let mut tree = ViewTree::new(
        TextDocument::new("hello world"),
        MonospaceMetrics::default(),
        LayoutConfig::default(),
    )
    .with_factory(Rc::new(KeepRowsFactory));
    let root = tree.build_root().expect("root");
    let alloc = Rect::from_size(48, 200);
    tree.layout(root, alloc.width, alloc.height).expect("layout");
    let flow = tree.child(root, 0).expect("flow");
    let outer = tree
        .child_allocation(root, 0, Some(alloc))
        .expect("alloc")
        .expect("laid out");
    let rows = tree.children(flow).expect("rows").to_vec();
    let (rebuilds, layouts) = (tree.stats().flow_rebuilds, tree.stats().layouts);

    tree.layout_changed(flow, Axis::X).expect("invalidate");
    tree.layout(flow, outer.width, outer.height).expect("relayout");
    assert_eq!(tree.stats().flow_rebuilds, rebuilds + 1);
    assert!(tree.stats().layouts > layouts);
    assert_eq!(tree.children(flow).expect("rows"), rows.as_slice());
    assert_eq!(tree.is_layout_valid(flow, Axis::X), Ok(true));
    assert_eq!(tree.is_layout_valid(flow, Axis::Y), Ok(true));
    assert_eq!(
        tree.child_allocation(flow, 1, Some(outer)).expect("alloc").map(|r| r.y),
        Some(outer.y + 16)
    );
}
