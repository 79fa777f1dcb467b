#![forbid(unsafe_code)]

//! Size negotiation for box-model layout.
//!
//! Every view reports, per axis, a [`SizeRequirements`] tuple: the smallest
//! span it can live with, the span it would like, the largest span it can use,
//! and an alignment point measured as a fraction of its extent from the
//! leading edge. Composites aggregate their children's tuples in one of two
//! ways:
//!
//! - **Tiled** ([`tiled_requirements`]): children are placed one after the
//!   other, so spans add up.
//! - **Aligned** ([`aligned_requirements`], [`baseline_requirements`]):
//!   children overlap along the axis and line up on their alignment points.
//!
//! Given a concrete target span, the placement functions in this crate turn
//! child tuples back into `(offset, span)` pairs.
//!
//! # Example
//!
//! ```
//! use viewtree_layout::{SizeRequirements, tiled_positions, tiled_requirements};
//!
//! let rows = [SizeRequirements::fixed(10); 4];
//! let total = tiled_requirements(&rows);
//! assert_eq!(total.preferred, 40);
//!
//! // Fixed children never stretch, whatever the target.
//! let placement = tiled_positions(435, &rows);
//! assert_eq!(placement.offsets, vec![0, 10, 20, 30]);
//! assert_eq!(placement.spans, vec![10, 10, 10, 10]);
//! ```
//!
//! # Output buffers
//!
//! Views recompute requirements and placements on every invalidation. Each
//! aggregate has an `_into` variant writing into a caller-owned value, and
//! the placement functions fill a caller-owned [`Placement`], so a view can
//! keep its buffers across layouts instead of allocating new ones.

mod positions;

pub use positions::{
    Placement, calculate_aligned_position, calculate_aligned_positions,
    calculate_baseline_positions, calculate_tiled_positions, tiled_positions,
};

/// Saturating "unbounded" span.
pub const INFINITE: i32 = i32::MAX;

/// Per-axis size negotiation tuple.
///
/// Well-formed values satisfy `0 <= minimum <= preferred <= maximum` and
/// `0.0 <= alignment <= 1.0`. `maximum` may be [`INFINITE`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRequirements {
    /// Smallest usable span.
    pub minimum: i32,
    /// Natural span.
    pub preferred: i32,
    /// Largest usable span.
    pub maximum: i32,
    /// Alignment point as a fraction of the span from the leading edge.
    pub alignment: f32,
}

impl Default for SizeRequirements {
    fn default() -> Self {
        Self::ZERO
    }
}

impl SizeRequirements {
    /// Zero-sized, centered.
    pub const ZERO: Self = Self::new(0, 0, 0, 0.5);

    /// Create a tuple from its four components.
    #[must_use]
    pub const fn new(minimum: i32, preferred: i32, maximum: i32, alignment: f32) -> Self {
        Self {
            minimum,
            preferred,
            maximum,
            alignment,
        }
    }

    /// A rigid span, centered.
    #[must_use]
    pub const fn fixed(span: i32) -> Self {
        Self::new(span, span, span, 0.5)
    }

    /// Whether the span can be anything but the preferred value.
    #[must_use]
    pub const fn is_flexible(&self) -> bool {
        self.minimum != self.preferred || self.preferred != self.maximum
    }

    /// Resize weight as reported by box views: 1 when flexible, 0 otherwise.
    #[must_use]
    pub const fn resize_weight(&self) -> i32 {
        if self.is_flexible() { 1 } else { 0 }
    }

    /// Check the ordering and alignment-range invariants.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        0 <= self.minimum
            && self.minimum <= self.preferred
            && self.preferred <= self.maximum
            && (0.0..=1.0).contains(&self.alignment)
    }

    /// Span before the alignment point, for a given span.
    #[inline]
    fn ascent_of(span: i32, alignment: f32) -> i64 {
        (f64::from(alignment) * f64::from(span)) as i64
    }
}

#[inline]
pub(crate) fn saturate(value: i64) -> i32 {
    value.clamp(0, i64::from(INFINITE)) as i32
}

/// Combined requirement for children tiled along an axis.
///
/// Minimum, preferred, and maximum are sums saturating at [`INFINITE`]. The
/// alignment is the preferred-weighted mean of the children's alignments,
/// 0.5 when nothing has a preferred span.
#[must_use]
pub fn tiled_requirements(children: &[SizeRequirements]) -> SizeRequirements {
    let mut total = SizeRequirements::ZERO;
    tiled_requirements_into(children, &mut total);
    total
}

/// [`tiled_requirements`] writing into `out`.
pub fn tiled_requirements_into(children: &[SizeRequirements], out: &mut SizeRequirements) {
    let mut minimum = 0i64;
    let mut preferred = 0i64;
    let mut maximum = 0i64;
    let mut leading = 0f64;

    for child in children {
        minimum += i64::from(child.minimum);
        preferred += i64::from(child.preferred);
        maximum += i64::from(child.maximum);
        leading += f64::from(child.alignment) * f64::from(child.preferred);
    }

    out.minimum = saturate(minimum);
    out.preferred = saturate(preferred);
    out.maximum = saturate(maximum);
    out.alignment = if preferred > 0 {
        (leading / preferred as f64).clamp(0.0, 1.0) as f32
    } else {
        0.5
    };
}

/// Combined requirement for children overlapping along an axis.
///
/// Minimum and preferred are the largest of the children's values; the
/// maximum is `parent_maximum`, supplied by the caller. The alignment divides
/// the largest span before any child's alignment point by that plus the
/// largest span after one.
#[must_use]
pub fn aligned_requirements(
    children: &[SizeRequirements],
    parent_maximum: i32,
) -> SizeRequirements {
    let mut total = SizeRequirements::ZERO;
    aligned_requirements_into(children, parent_maximum, &mut total);
    total
}

/// [`aligned_requirements`] writing into `out`.
pub fn aligned_requirements_into(
    children: &[SizeRequirements],
    parent_maximum: i32,
    out: &mut SizeRequirements,
) {
    let mut minimum = 0;
    let mut preferred = 0;
    let mut ascent = 0i64;
    let mut descent = 0i64;

    for child in children {
        minimum = minimum.max(child.minimum);
        preferred = preferred.max(child.preferred);
        let before = SizeRequirements::ascent_of(child.preferred, child.alignment);
        ascent = ascent.max(before);
        descent = descent.max(i64::from(child.preferred) - before);
    }

    out.minimum = minimum;
    out.preferred = preferred;
    out.maximum = parent_maximum.max(preferred);
    out.alignment = if ascent + descent > 0 {
        (ascent as f64 / (ascent + descent) as f64) as f32
    } else {
        0.5
    };
}

/// Combined requirement for children sharing a baseline.
///
/// Each child contributes the span before and after its alignment point;
/// the result is the largest ascent plus the largest descent, computed
/// separately for minimum, preferred, and maximum. Rigid children use their
/// preferred span for all three. The alignment is the preferred ascent over
/// the preferred span.
#[must_use]
pub fn baseline_requirements(children: &[SizeRequirements]) -> SizeRequirements {
    let mut total = SizeRequirements::ZERO;
    baseline_requirements_into(children, &mut total);
    total
}

/// [`baseline_requirements`] writing into `out`.
pub fn baseline_requirements_into(children: &[SizeRequirements], out: &mut SizeRequirements) {
    // [minimum, preferred, maximum]
    let mut ascent = [0i64; 3];
    let mut descent = [0i64; 3];

    for child in children {
        let spans = if child.is_flexible() {
            [child.minimum, child.preferred, child.maximum]
        } else {
            [child.preferred; 3]
        };
        for (k, span) in spans.into_iter().enumerate() {
            let before = SizeRequirements::ascent_of(span, child.alignment);
            ascent[k] = ascent[k].max(before);
            descent[k] = descent[k].max(i64::from(span) - before);
        }
    }

    out.minimum = saturate(ascent[0] + descent[0]);
    out.preferred = saturate(ascent[1] + descent[1]);
    out.maximum = saturate(ascent[2] + descent[2]);
    out.alignment = if out.preferred > 0 {
        (ascent[1] as f64 / f64::from(out.preferred)) as f32
    } else {
        0.5
    };
}
