#![forbid(unsafe_code)]

//! Glyph views: leaves over a run of text, or a fragment of one.
//!
//! A glyph's text is the document text of its range with one trailing
//! `'\n'` dropped. The newline still belongs to the range (so caret offsets
//! reach it) but has no width and is never painted.

use crate::id::ViewId;
use crate::node::{LayoutNode, ViewKind};
use crate::tree::ViewTree;
use unicode_bidi::BidiInfo;
use unicode_segmentation::UnicodeSegmentation;
use viewtree_core::{Axis, Bias, Direction, LayoutError, Rect, Result};
use viewtree_doc::Document;
use viewtree_layout::SizeRequirements;

/// Byte length of the first `chars` characters of `text`.
fn byte_len(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(index, _)| index)
}

fn is_whitespace(segment: &str) -> bool {
    segment.chars().all(char::is_whitespace)
}

impl<D: Document> ViewTree<D> {
    /// Visible text of a glyph (without its trailing newline).
    pub fn text(&self, view: ViewId) -> Result<String> {
        self.glyph_body(view).map(|(_, _, body)| body)
    }

    /// `(start, end, text)` of a glyph.
    pub(crate) fn glyph_body(&self, view: ViewId) -> Result<(usize, usize, String)> {
        let (start, end) = self.range(view)?;
        let mut text = self.doc_text(start, end.saturating_sub(start))?;
        if text.ends_with('\n') {
            text.pop();
        }
        Ok((start, end, text))
    }

    fn measure(&self, view: ViewId, text: &str) -> Result<i32> {
        let element = self.node(view)?.element;
        Ok(self.metrics.advance(text, self.doc.attributes(element)))
    }

    pub(crate) fn glyph_requirements(&self, view: ViewId, axis: Axis) -> Result<SizeRequirements> {
        let element = self.node(view)?.element;
        let attributes = self.doc.attributes(element);
        match axis {
            Axis::X => {
                let (_, _, body) = self.glyph_body(view)?;
                let preferred = self.metrics.advance(&body, attributes);
                let widest_word = body
                    .split_word_bounds()
                    .filter(|word| !is_whitespace(word))
                    .map(|word| self.metrics.advance(word, attributes))
                    .max()
                    .unwrap_or(0);
                Ok(SizeRequirements::new(
                    widest_word.min(preferred),
                    preferred,
                    preferred,
                    0.5,
                ))
            }
            Axis::Y => {
                let height = self.metrics.line_height(attributes).max(0);
                let ascent = self.metrics.ascent(attributes).clamp(0, height);
                let alignment = if height > 0 {
                    ascent as f32 / height as f32
                } else {
                    0.5
                };
                Ok(SizeRequirements::new(height, height, height, alignment))
            }
        }
    }

    /// Whether the glyph's text resolves to a right-to-left paragraph
    /// level. Always `false` for composites.
    pub fn is_rtl(&self, view: ViewId) -> Result<bool> {
        if !self.node(view)?.kind.is_glyph() {
            return Ok(false);
        }
        let (_, _, body) = self.glyph_body(view)?;
        if body.is_empty() {
            return Ok(false);
        }
        let info = BidiInfo::new(&body, None);
        Ok(info.paragraphs.first().is_some_and(|p| p.level.is_rtl()))
    }

    /// New unattached glyph covering `[p0, p1)` of `view`.
    pub fn create_fragment(&mut self, view: ViewId, p0: usize, p1: usize) -> Result<ViewId> {
        let node = self.node(view)?;
        if !node.kind.is_glyph() {
            return Err(LayoutError::BadLocation { offset: p0 });
        }
        let element = node.element;
        let (start, end) = self.range(view)?;
        if p0 < start || p0 > p1 {
            return Err(LayoutError::OffsetOutOfRange {
                offset: p0,
                start,
                end,
            });
        }
        if p1 > end {
            return Err(LayoutError::OffsetOutOfRange {
                offset: p1,
                start,
                end,
            });
        }
        let mut fragment = LayoutNode::new(element, ViewKind::Glyph);
        fragment.range = Some((p0, p1));
        Ok(self.insert_node(fragment))
    }

    /// Piece of `view` starting at `offset` that fits in `span`.
    ///
    /// Breaks after whitespace when possible. Without a fitting word break,
    /// `force` cuts between graphemes, keeping at least one. Returns `view`
    /// itself when it starts at `offset` and its text fits; `None` for
    /// non-glyphs, offsets outside the view, or when nothing fits and
    /// `force` is off.
    pub fn break_view(
        &mut self,
        view: ViewId,
        offset: usize,
        span: i32,
        force: bool,
    ) -> Result<Option<ViewId>> {
        if !self.node(view)?.kind.is_glyph() {
            return Ok(None);
        }
        let (start, end) = self.range(view)?;
        if offset < start || offset >= end {
            return Ok(None);
        }
        let mut text = self.doc_text(offset, end - offset)?;
        if text.ends_with('\n') {
            text.pop();
        }
        let body_end = offset + text.chars().count();

        let cut = if self.measure(view, &text)? <= span {
            Some(body_end - offset)
        } else {
            let mut best = None;
            let (mut chars, mut bytes) = (0usize, 0usize);
            for segment in text.split_word_bounds() {
                chars += segment.chars().count();
                bytes += segment.len();
                if self.measure(view, &text[..bytes])? > span {
                    break;
                }
                if is_whitespace(segment) {
                    best = Some(chars);
                }
            }
            if best.is_none() && force {
                let (mut chars, mut bytes) = (0usize, 0usize);
                for grapheme in text.graphemes(true) {
                    let next = bytes + grapheme.len();
                    if chars > 0 && self.measure(view, &text[..next])? > span {
                        break;
                    }
                    chars += grapheme.chars().count();
                    bytes = next;
                }
                (chars > 0).then_some(chars)
            } else {
                best
            }
        };

        let Some(chars) = cut else {
            return Ok(None);
        };
        let cut = offset + chars;
        if cut >= body_end {
            // The rest of the text fits; keep the newline with it.
            if offset == start {
                return Ok(Some(view));
            }
            return self.create_fragment(view, offset, end).map(Some);
        }
        self.create_fragment(view, offset, cut).map(Some)
    }

    /// Zero-width caret rectangle at `pos` inside `alloc`.
    pub(crate) fn glyph_model_to_view(&self, view: ViewId, pos: usize, alloc: Rect) -> Result<Rect> {
        let (start, end, body) = self.glyph_body(view)?;
        if pos < start || pos > end {
            return Err(LayoutError::BadLocation { offset: pos });
        }
        let prefix = &body[..byte_len(&body, pos - start)];
        let advance = self.measure(view, prefix)?;
        let x = if self.is_rtl(view)? {
            alloc.right() - advance
        } else {
            alloc.x + advance
        };
        Ok(Rect::new(x, alloc.y, 0, alloc.height))
    }

    /// Nearest character boundary to `x`.
    pub(crate) fn glyph_view_to_model(
        &self,
        view: ViewId,
        x: i32,
        alloc: Rect,
    ) -> Result<(usize, Bias)> {
        let (start, end, body) = self.glyph_body(view)?;
        let local = if self.is_rtl(view)? {
            alloc.right().saturating_sub(x)
        } else {
            x.saturating_sub(alloc.x)
        };

        let mut index = body.chars().count();
        if local <= 0 {
            index = 0;
        } else {
            let (mut before, mut bytes) = (0i32, 0usize);
            for (i, ch) in body.chars().enumerate() {
                bytes += ch.len_utf8();
                let after = self.measure(view, &body[..bytes])?;
                if local < after {
                    let nearer_start = i64::from(local - before) * 2 < i64::from(after - before);
                    index = if nearer_start { i } else { i + 1 };
                    break;
                }
                before = after;
            }
        }

        let offset = start + index;
        let bias = if offset == end {
            Bias::Backward
        } else {
            Bias::Forward
        };
        Ok((offset, bias))
    }

    /// Caret slots of a glyph from left to right.
    ///
    /// Every offset of the range except the end, which belongs to the next
    /// view. A right-to-left glyph without a trailing newline also owns its
    /// left edge, the end offset with `Backward` bias.
    fn glyph_slots(&self, view: ViewId) -> Result<(Vec<(usize, Bias)>, bool)> {
        let (start, end, body) = self.glyph_body(view)?;
        let mut slots: Vec<_> = (start..end).map(|p| (p, Bias::Forward)).collect();
        let rtl = self.is_rtl(view)?;
        if rtl {
            slots.reverse();
            if start + body.chars().count() == end {
                slots.insert(0, (end, Bias::Backward));
            }
        }
        Ok((slots, rtl))
    }

    /// One caret step inside a glyph, in visual order; vertical moves are
    /// left to the parent.
    ///
    /// `bias` matters at the end offset of a right-to-left glyph: with
    /// `Backward` it is the glyph's left edge, with `Forward` it belongs to
    /// the next view and the glyph has nothing to offer.
    pub(crate) fn glyph_step(
        &self,
        view: ViewId,
        pos: Option<usize>,
        bias: Bias,
        direction: Direction,
    ) -> Result<Option<(usize, Bias)>> {
        if !direction.is_horizontal() {
            return Ok(None);
        }
        let (slots, rtl) = self.glyph_slots(view)?;
        let Some(pos) = pos else {
            let entry = match direction {
                Direction::West => slots.last(),
                _ => slots.first(),
            };
            return Ok(entry.copied());
        };
        if rtl
            && bias == Bias::Forward
            && slots.first().is_some_and(|&(p, b)| p == pos && b == Bias::Backward)
        {
            return Ok(None);
        }
        // Left-to-right rank of an offset.
        let rank = |offset: usize| {
            let offset = i64::try_from(offset).unwrap_or(i64::MAX);
            if rtl { -offset } else { offset }
        };
        let here = rank(pos);
        let next = match direction {
            Direction::West => slots.iter().rev().find(|(p, _)| rank(*p) < here),
            _ => slots.iter().find(|(p, _)| rank(*p) > here),
        };
        Ok(next.copied())
    }

    /// Whether `offset` is the right edge of a right-to-left glyph. That
    /// edge is also the left edge of whatever follows the glyph.
    pub(crate) fn is_trailing_rtl_edge(&self, view: ViewId, offset: usize) -> Result<bool> {
        Ok(self.start_offset(view)? == offset && self.is_rtl(view)?)
    }
}
