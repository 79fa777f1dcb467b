#![forbid(unsafe_code)]

//! Arena records: one [`LayoutNode`] per view, with a kind-specific payload.

use crate::flow::FlowStrategy;
use crate::id::ViewId;
use bitflags::bitflags;
use std::fmt;
use viewtree_core::{Axis, Insets};
use viewtree_doc::ElementId;
use viewtree_layout::{INFINITE, Placement, SizeRequirements};

bitflags! {
    /// A set of layout axes, used for validity bits and invalidation requests.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AxisSet: u8 {
        const X = 0b01;
        const Y = 0b10;
    }
}

impl AxisSet {
    /// The set holding just `axis`.
    #[must_use]
    pub const fn of(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::X,
            Axis::Y => Self::Y,
        }
    }

    /// Build from per-axis "width changed" / "height changed" flags.
    #[must_use]
    pub fn from_flags(width: bool, height: bool) -> Self {
        let mut set = Self::empty();
        set.set(Self::X, width);
        set.set(Self::Y, height);
        set
    }
}

/// Public classification of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    /// Leaf over a run of text, or a fragment of one.
    Glyph,
    /// Tiles children along a major axis, aligns them on the other.
    Box,
    /// Horizontal line of a flow, aligned on a shared baseline.
    Row,
    /// Rebuilds rows from its layout pool on demand.
    Flow,
    /// Unrendered one-view-per-element children of a flow.
    Pool,
}

#[inline]
pub(crate) const fn slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}

/// Cached tiling state of a box-like view.
#[derive(Debug, Clone)]
pub(crate) struct BoxState {
    pub(crate) major: Axis,
    pub(crate) requests: [SizeRequirements; 2],
    pub(crate) request_valid: AxisSet,
    pub(crate) allocation_valid: AxisSet,
    pub(crate) placements: [Placement; 2],
    /// Inside spans given to the last layout.
    pub(crate) spans: [i32; 2],
    /// Child index of the previous hit test.
    pub(crate) last_hit: usize,
}

impl BoxState {
    pub(crate) fn new(major: Axis) -> Self {
        Self {
            major,
            requests: [SizeRequirements::ZERO; 2],
            request_valid: AxisSet::empty(),
            allocation_valid: AxisSet::empty(),
            placements: [Placement::default(), Placement::default()],
            spans: [0; 2],
            last_hit: 0,
        }
    }

    pub(crate) fn invalidate(&mut self, axes: AxisSet) {
        self.request_valid.remove(axes);
        self.allocation_valid.remove(axes);
    }

    pub(crate) fn is_allocation_valid(&self) -> bool {
        self.allocation_valid.is_all()
    }

    pub(crate) fn minor(&self) -> Axis {
        self.major.other()
    }
}

/// State of a flow view: a Y-major box over rows plus the pool they come from.
pub(crate) struct FlowState {
    pub(crate) boxed: BoxState,
    pub(crate) pool: Option<ViewId>,
    pub(crate) strategy: Option<Box<dyn FlowStrategy>>,
    /// Flow-axis span of the last layout, [`INFINITE`] until laid out.
    pub(crate) layout_span: i32,
    pub(crate) first_line_indent: i32,
}

impl FlowState {
    pub(crate) fn new(strategy: Box<dyn FlowStrategy>, first_line_indent: i32) -> Self {
        Self {
            boxed: BoxState::new(Axis::Y),
            pool: None,
            strategy: Some(strategy),
            layout_span: INFINITE,
            first_line_indent,
        }
    }
}

impl fmt::Debug for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowState")
            .field("boxed", &self.boxed)
            .field("pool", &self.pool)
            .field("has_strategy", &self.strategy.is_some())
            .field("layout_span", &self.layout_span)
            .field("first_line_indent", &self.first_line_indent)
            .finish()
    }
}

#[derive(Debug)]
pub(crate) enum ViewKind {
    Glyph,
    Box(BoxState),
    Row(BoxState),
    Flow(FlowState),
    Pool,
}

impl ViewKind {
    pub(crate) const fn is_glyph(&self) -> bool {
        matches!(self, Self::Glyph)
    }
}

/// One view in the arena.
///
/// `parent` is the view currently displaying this one; `owner` is the view
/// whose `replace` destroys it. They differ only for pool children placed
/// into a row, where the row borrows what the pool owns.
#[derive(Debug)]
pub(crate) struct LayoutNode {
    pub(crate) parent: Option<ViewId>,
    pub(crate) owner: Option<ViewId>,
    pub(crate) element: ElementId,
    /// Explicit `[start, end)` for fragments; `None` follows the element.
    pub(crate) range: Option<(usize, usize)>,
    pub(crate) children: Vec<ViewId>,
    pub(crate) insets: Insets,
    pub(crate) kind: ViewKind,
}

impl LayoutNode {
    pub(crate) fn new(element: ElementId, kind: ViewKind) -> Self {
        Self {
            parent: None,
            owner: None,
            element,
            range: None,
            children: Vec::new(),
            insets: Insets::ZERO,
            kind,
        }
    }

    pub(crate) fn view_type(&self) -> ViewType {
        match self.kind {
            ViewKind::Glyph => ViewType::Glyph,
            ViewKind::Box(_) => ViewType::Box,
            ViewKind::Row(_) => ViewType::Row,
            ViewKind::Flow(_) => ViewType::Flow,
            ViewKind::Pool => ViewType::Pool,
        }
    }

    pub(crate) fn box_state(&self) -> Option<&BoxState> {
        match &self.kind {
            ViewKind::Box(b) | ViewKind::Row(b) => Some(b),
            ViewKind::Flow(f) => Some(&f.boxed),
            ViewKind::Glyph | ViewKind::Pool => None,
        }
    }

    pub(crate) fn box_state_mut(&mut self) -> Option<&mut BoxState> {
        match &mut self.kind {
            ViewKind::Box(b) | ViewKind::Row(b) => Some(b),
            ViewKind::Flow(f) => Some(&mut f.boxed),
            ViewKind::Glyph | ViewKind::Pool => None,
        }
    }

    pub(crate) fn flow_state(&self) -> Option<&FlowState> {
        match &self.kind {
            ViewKind::Flow(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn flow_state_mut(&mut self) -> Option<&mut FlowState> {
        match &mut self.kind {
            ViewKind::Flow(f) => Some(f),
            _ => None,
        }
    }

    pub(crate) fn is_composite(&self) -> bool {
        !self.kind.is_glyph()
    }
}
