#![forbid(unsafe_code)]

//! Turning requirement tuples into concrete `(offset, span)` pairs.

use crate::{SizeRequirements, saturate};

/// Offsets and spans computed for a run of children, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub offsets: Vec<i32>,
    pub spans: Vec<i32>,
}

impl Placement {
    /// Empty placement with room for `n` children.
    #[must_use]
    pub fn with_capacity(n: usize) -> Self {
        Self {
            offsets: Vec::with_capacity(n),
            spans: Vec::with_capacity(n),
        }
    }

    /// Number of placed children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// True when nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// `(offset, span)` of child `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(i32, i32)> {
        Some((*self.offsets.get(index)?, *self.spans.get(index)?))
    }

    /// Total of all spans, saturating.
    #[must_use]
    pub fn total_span(&self) -> i32 {
        saturate(self.spans.iter().map(|&s| i64::from(s)).sum())
    }

    fn reset(&mut self, n: usize) {
        self.offsets.clear();
        self.offsets.resize(n, 0);
        self.spans.clear();
        self.spans.resize(n, 0);
    }
}

/// Tile `children` into `target`, allocating a fresh [`Placement`].
#[must_use]
pub fn tiled_positions(target: i32, children: &[SizeRequirements]) -> Placement {
    let mut placement = Placement::with_capacity(children.len());
    calculate_tiled_positions(target, children, &mut placement);
    placement
}

/// Tile `children` sequentially into `target`, writing into `out`.
///
/// Three regimes, judged against the children's combined requirement:
///
/// - `target` below the combined minimum: every child gets its minimum and
///   the run overflows.
/// - `target` at or above the combined maximum: every child gets its maximum.
/// - otherwise every child moves from its preferred span toward its minimum
///   (or maximum) in proportion to its own range. Rounding leftovers go to
///   the trailing children, so the spans sum to exactly `target`.
///
/// Offsets are the running sum of the preceding spans.
pub fn calculate_tiled_positions(target: i32, children: &[SizeRequirements], out: &mut Placement) {
    out.reset(children.len());

    // Unsaturated totals: several unbounded children must not collapse into
    // one sentinel when computing proportions.
    let mut min_total = 0i64;
    let mut pref_total = 0i64;
    let mut max_total = 0i64;
    for child in children {
        min_total += i64::from(child.minimum);
        pref_total += i64::from(child.preferred);
        max_total += i64::from(child.maximum);
    }

    let target = i64::from(target);
    let mut spans: Vec<i64> = Vec::with_capacity(children.len());

    if target < min_total {
        spans.extend(children.iter().map(|c| i64::from(c.minimum)));
    } else if target >= max_total {
        spans.extend(children.iter().map(|c| i64::from(c.maximum)));
    } else if target <= pref_total {
        let range = pref_total - min_total;
        let factor = if range > 0 {
            (pref_total - target) as f64 / range as f64
        } else {
            0.0
        };
        for c in children {
            let (min, pref) = (i64::from(c.minimum), i64::from(c.preferred));
            let shrink = (factor * (pref - min) as f64) as i64;
            spans.push((pref - shrink).clamp(min, pref.max(min)));
        }
        settle_residual(target, &mut spans, children, |c| {
            (i64::from(c.minimum), i64::from(c.preferred))
        });
    } else {
        let factor = (target - pref_total) as f64 / (max_total - pref_total) as f64;
        for c in children {
            let (pref, max) = (i64::from(c.preferred), i64::from(c.maximum));
            let grow = (factor * (max - pref) as f64) as i64;
            spans.push((pref + grow).clamp(pref, max.max(pref)));
        }
        settle_residual(target, &mut spans, children, |c| {
            (i64::from(c.preferred), i64::from(c.maximum))
        });
    }

    let mut offset = 0i64;
    for (i, span) in spans.into_iter().enumerate() {
        out.offsets[i] = saturate(offset);
        out.spans[i] = saturate(span);
        offset += span;
    }
}

/// Push the rounding leftover onto the trailing children, within each
/// child's `[lower, upper]` bounds for the active regime.
fn settle_residual<F>(target: i64, spans: &mut [i64], children: &[SizeRequirements], bounds: F)
where
    F: Fn(&SizeRequirements) -> (i64, i64),
{
    let mut diff = target - spans.iter().sum::<i64>();
    for (span, child) in spans.iter_mut().zip(children).rev() {
        if diff == 0 {
            break;
        }
        let (lower, upper) = bounds(child);
        if diff > 0 {
            let take = diff.min((upper - *span).max(0));
            *span += take;
            diff -= take;
        } else {
            let give = (-diff).min((*span - lower).max(0));
            *span -= give;
            diff += give;
        }
    }
}

/// Place one child across an axis of `target` pixels.
///
/// The span is `target` clamped into `[minimum, maximum]`, the minimum
/// winning when it exceeds `target`. The child is offset by its alignment
/// share of the leftover space, never negatively.
#[must_use]
pub fn calculate_aligned_position(target: i32, child: &SizeRequirements) -> (i32, i32) {
    let span = if target < child.minimum {
        child.minimum
    } else {
        target.min(child.maximum)
    };
    let free = i64::from(target) - i64::from(span);
    let offset = (free as f64 * f64::from(child.alignment)) as i64;
    (saturate(offset), span)
}

/// [`calculate_aligned_position`] for every child, writing into `out`.
pub fn calculate_aligned_positions(
    target: i32,
    children: &[SizeRequirements],
    out: &mut Placement,
) {
    out.reset(children.len());
    for (i, child) in children.iter().enumerate() {
        let (offset, span) = calculate_aligned_position(target, child);
        out.offsets[i] = offset;
        out.spans[i] = span;
    }
}

/// Place children so their alignment points meet at `target * alignment`.
///
/// Rigid children keep their preferred span. Flexible children take the
/// largest span that fits on both sides of the shared point, clamped into
/// their `[minimum, maximum]`. Offsets may be negative when a child's
/// ascent exceeds the shared point.
pub fn calculate_baseline_positions(
    target: i32,
    alignment: f32,
    children: &[SizeRequirements],
    out: &mut Placement,
) {
    out.reset(children.len());
    let target = i64::from(target);
    let total_ascent = (target as f64 * f64::from(alignment)) as i64;
    let total_descent = target - total_ascent;

    for (i, child) in children.iter().enumerate() {
        let align = f64::from(child.alignment);
        let span = if child.is_flexible() {
            let fit = if align == 0.0 {
                total_descent
            } else if align == 1.0 {
                total_ascent
            } else {
                let above = (total_ascent as f64 / align) as i64;
                let below = (total_descent as f64 / (1.0 - align)) as i64;
                above.min(below)
            };
            fit.min(i64::from(child.maximum))
                .max(i64::from(child.minimum))
        } else {
            i64::from(child.preferred)
        };
        let offset = total_ascent - (span as f64 * align) as i64;
        out.offsets[i] = offset.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        out.spans[i] = saturate(span);
    }
}
