#![forbid(unsafe_code)]

//! In-memory three-level document: root, paragraphs, runs.
//!
//! # Structure
//!
//! - The root covers `[0, length + 1)`; the extra position is the implicit
//!   trailing newline that ends the last paragraph.
//! - Every paragraph ends with exactly one `'\n'` and holds one or more runs.
//! - Runs are leaves carrying an attribute set. The newline belongs to the
//!   paragraph's last run.
//!
//! # Edits and events
//!
//! | Edit | Structural change |
//! |------|-------------------|
//! | insert without `'\n'` | none, the run grows |
//! | insert with `'\n'` | root: paragraph replaced by the split paragraphs |
//! | remove inside a paragraph | paragraph: runs emptied by the edit are removed |
//! | remove across paragraphs | root: touched paragraphs replaced by one merged paragraph |
//! | attribute change | none |
//!
//! Offsets count `char`s, not bytes.

use crate::attributes::Attributes;
use crate::document::Document;
use crate::element::{ElementId, PARAGRAPH_NAME, ROOT_NAME, RUN_NAME};
use crate::error::DocumentError;
use crate::event::{DocumentEvent, ElementChange, EventKind};
use std::collections::BTreeMap;
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Root,
    Paragraph,
    Run,
}

impl ElementKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Root => ROOT_NAME,
            Self::Paragraph => PARAGRAPH_NAME,
            Self::Run => RUN_NAME,
        }
    }
}

#[derive(Debug, Clone)]
struct ElementRecord {
    kind: ElementKind,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    start: usize,
    end: usize,
    attributes: Attributes,
}

impl ElementRecord {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Run description used while rebuilding paragraphs: length and attributes.
type RunSpec = (usize, Attributes);

/// Editable text document producing [`DocumentEvent`]s.
#[derive(Debug, Clone)]
pub struct TextDocument {
    chars: Vec<char>,
    elements: BTreeMap<ElementId, ElementRecord>,
    root: ElementId,
    next_id: ElementId,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextDocument {
    /// Document with one paragraph (and one run) per line of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut builder = Self::builder();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                builder = builder.end_paragraph();
            }
            builder = builder.run(line);
        }
        builder.build()
    }

    /// Start assembling a document run by run.
    #[must_use]
    pub fn builder() -> TextDocumentBuilder {
        TextDocumentBuilder::default()
    }

    /// Ids of the paragraphs, in order.
    #[must_use]
    pub fn paragraphs(&self) -> &[ElementId] {
        self.elements
            .get(&self.root)
            .map_or(&[], |root| root.children.as_slice())
    }

    /// Whole content, without the implicit trailing newline.
    #[must_use]
    pub fn content(&self) -> String {
        self.chars[..self.length()].iter().collect()
    }

    /// Insert `text` at `offset`.
    pub fn insert_string(
        &mut self,
        offset: usize,
        text: &str,
    ) -> Result<DocumentEvent, DocumentError> {
        if offset > self.length() {
            return Err(DocumentError::BadLocation { offset, length: 0 });
        }
        let inserted: Vec<char> = text.chars().collect();
        let n = inserted.len();
        if n == 0 {
            return Ok(DocumentEvent::new(EventKind::Insert, offset, 0, Vec::new()));
        }

        let p_index = self.paragraph_index_at(offset);
        let paragraph = self.paragraphs()[p_index];
        let (p_start, runs) = match self.elements.get(&paragraph) {
            Some(rec) => (rec.start, rec.children.clone()),
            None => return Err(DocumentError::BadLocation { offset, length: n }),
        };
        // New text takes the attributes of the character before it.
        let r_index = if offset > p_start {
            self.child_index_at(paragraph, offset - 1)
        } else {
            0
        };

        self.chars.splice(offset..offset, inserted.iter().copied());

        if !inserted.contains(&'\n') {
            if let Some(run) = runs.get(r_index).and_then(|r| self.elements.get_mut(r)) {
                run.end += n;
            }
            self.reindex();
            return Ok(DocumentEvent::new(EventKind::Insert, offset, n, Vec::new()));
        }

        let mut specs = self.run_specs(&runs);
        if let Some(spec) = specs.get_mut(r_index) {
            spec.0 += n;
        }
        let change = self.rebuild_paragraphs(p_index, p_index, p_start, specs);
        Ok(DocumentEvent::new(EventKind::Insert, offset, n, vec![change]))
    }

    /// Remove `length` characters starting at `offset`.
    pub fn remove(&mut self, offset: usize, length: usize) -> Result<DocumentEvent, DocumentError> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.length())
            .ok_or(DocumentError::BadLocation { offset, length })?;
        if length == 0 {
            return Ok(DocumentEvent::new(EventKind::Remove, offset, 0, Vec::new()));
        }

        let first = self.paragraph_index_at(offset);
        // The paragraph holding the first surviving character after the range.
        let last = self.paragraph_index_at(end);
        let paragraphs: Vec<ElementId> = self.paragraphs()[first..=last].to_vec();

        let mut specs = Vec::new();
        let mut emptied = Vec::new();
        let mut first_emptied = None;
        let mut p_start = 0;
        for (pi, paragraph) in paragraphs.iter().enumerate() {
            let Some(rec) = self.elements.get(paragraph) else {
                continue;
            };
            if pi == 0 {
                p_start = rec.start;
            }
            for (ri, run) in rec.children.clone().into_iter().enumerate() {
                let Some(run_rec) = self.elements.get_mut(&run) else {
                    continue;
                };
                let overlap = run_rec.end.min(end).saturating_sub(run_rec.start.max(offset));
                let remaining = run_rec.len() - overlap;
                if first == last {
                    run_rec.end = run_rec.start + remaining;
                    if remaining == 0 {
                        first_emptied.get_or_insert(ri);
                        emptied.push(run);
                    }
                } else if remaining > 0 {
                    specs.push((remaining, run_rec.attributes.clone()));
                }
            }
        }

        self.chars.drain(offset..end);

        if first != last {
            let change = self.rebuild_paragraphs(first, last, p_start, specs);
            return Ok(DocumentEvent::new(EventKind::Remove, offset, length, vec![change]));
        }

        let mut changes = Vec::new();
        if let Some(index) = first_emptied {
            let paragraph = paragraphs[0];
            if let Some(rec) = self.elements.get_mut(&paragraph) {
                rec.children.retain(|r| !emptied.contains(r));
            }
            for run in &emptied {
                self.elements.remove(run);
            }
            changes.push(ElementChange {
                element: paragraph,
                index,
                removed: emptied,
                added: Vec::new(),
            });
        }
        self.reindex();
        Ok(DocumentEvent::new(EventKind::Remove, offset, length, changes))
    }

    /// Merge `attributes` into every run overlapping `[offset, offset + length)`.
    pub fn set_run_attributes(
        &mut self,
        offset: usize,
        length: usize,
        attributes: &Attributes,
    ) -> Result<DocumentEvent, DocumentError> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.length())
            .ok_or(DocumentError::BadLocation { offset, length })?;
        for rec in self.elements.values_mut() {
            if rec.kind == ElementKind::Run && rec.start < end && rec.end > offset {
                rec.attributes.merge(attributes);
            }
        }
        Ok(DocumentEvent::new(EventKind::Change, offset, length, Vec::new()))
    }

    fn allocate(&mut self, kind: ElementKind, parent: Option<ElementId>) -> ElementId {
        let id = self.next_id;
        self.next_id = id.next();
        self.elements.insert(
            id,
            ElementRecord {
                kind,
                parent,
                children: Vec::new(),
                start: 0,
                end: 0,
                attributes: Attributes::new(),
            },
        );
        id
    }

    /// Create a paragraph whose runs have the given lengths and attributes.
    /// Offsets are provisional until the next `reindex`.
    fn create_paragraph(&mut self, at: usize, runs: Vec<RunSpec>) -> ElementId {
        let paragraph = self.allocate(ElementKind::Paragraph, Some(self.root));
        let mut cursor = at;
        let mut children = Vec::with_capacity(runs.len());
        for (len, attributes) in runs {
            let run = self.allocate(ElementKind::Run, Some(paragraph));
            if let Some(rec) = self.elements.get_mut(&run) {
                rec.start = cursor;
                rec.end = cursor + len;
                rec.attributes = attributes;
            }
            cursor += len;
            children.push(run);
        }
        if let Some(rec) = self.elements.get_mut(&paragraph) {
            rec.start = at;
            rec.end = cursor;
            rec.children = children;
        }
        paragraph
    }

    fn run_specs(&self, runs: &[ElementId]) -> Vec<RunSpec> {
        runs.iter()
            .filter_map(|r| self.elements.get(r))
            .map(|rec| (rec.len(), rec.attributes.clone()))
            .collect()
    }

    /// Replace root children `first..=last` with paragraphs cut from `specs`
    /// at every newline. `specs` describe the current content from `start`.
    fn rebuild_paragraphs(
        &mut self,
        first: usize,
        last: usize,
        start: usize,
        specs: Vec<RunSpec>,
    ) -> ElementChange {
        let mut paragraphs: Vec<Vec<RunSpec>> = Vec::new();
        let mut current: Vec<RunSpec> = Vec::new();
        let mut pos = start;
        for (len, attributes) in specs {
            let end = pos + len;
            let mut seg_start = pos;
            for i in pos..end {
                if self.chars.get(i) == Some(&'\n') {
                    current.push((i + 1 - seg_start, attributes.clone()));
                    paragraphs.push(mem::take(&mut current));
                    seg_start = i + 1;
                }
            }
            if seg_start < end {
                current.push((end - seg_start, attributes));
            }
            pos = end;
        }
        if !current.is_empty() {
            paragraphs.push(current);
        }

        let removed: Vec<ElementId> = self.paragraphs()[first..=last].to_vec();
        for paragraph in &removed {
            if let Some(rec) = self.elements.remove(paragraph) {
                for run in rec.children {
                    self.elements.remove(&run);
                }
            }
        }

        let mut at = start;
        let mut added = Vec::with_capacity(paragraphs.len());
        for runs in paragraphs {
            let len: usize = runs.iter().map(|(l, _)| l).sum();
            added.push(self.create_paragraph(at, runs));
            at += len;
        }

        if let Some(root) = self.elements.get_mut(&self.root) {
            root.children.splice(first..=last, added.iter().copied());
        }
        self.reindex();

        ElementChange {
            element: self.root,
            index: first,
            removed,
            added,
        }
    }

    /// Recompute every start/end from run lengths.
    fn reindex(&mut self) {
        let paragraphs = self.paragraphs().to_vec();
        let mut offset = 0;
        for paragraph in paragraphs {
            let runs = match self.elements.get(&paragraph) {
                Some(rec) => rec.children.clone(),
                None => continue,
            };
            let p_start = offset;
            for run in runs {
                if let Some(rec) = self.elements.get_mut(&run) {
                    let len = rec.len();
                    rec.start = offset;
                    rec.end = offset + len;
                    offset += len;
                }
            }
            if let Some(rec) = self.elements.get_mut(&paragraph) {
                rec.start = p_start;
                rec.end = offset;
            }
        }
        if let Some(root) = self.elements.get_mut(&self.root) {
            root.start = 0;
            root.end = offset;
        }
    }

    fn paragraph_index_at(&self, offset: usize) -> usize {
        self.element_index(self.root, offset)
    }

    fn child_index_at(&self, element: ElementId, offset: usize) -> usize {
        self.element_index(element, offset)
    }
}

impl Document for TextDocument {
    fn length(&self) -> usize {
        self.chars.len().saturating_sub(1)
    }

    fn default_root(&self) -> ElementId {
        self.root
    }

    fn start_offset(&self, element: ElementId) -> usize {
        self.elements.get(&element).map_or(0, |rec| rec.start)
    }

    fn end_offset(&self, element: ElementId) -> usize {
        self.elements.get(&element).map_or(0, |rec| rec.end)
    }

    fn child_count(&self, element: ElementId) -> usize {
        self.elements.get(&element).map_or(0, |rec| rec.children.len())
    }

    fn child(&self, element: ElementId, index: usize) -> Option<ElementId> {
        self.elements.get(&element)?.children.get(index).copied()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.elements.get(&element)?.parent
    }

    fn name(&self, element: ElementId) -> &str {
        self.elements.get(&element).map_or("", |rec| rec.kind.name())
    }

    fn attributes(&self, element: ElementId) -> Option<&Attributes> {
        self.elements.get(&element).map(|rec| &rec.attributes)
    }

    fn text(&self, offset: usize, length: usize) -> Result<String, DocumentError> {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.chars.len())
            .ok_or(DocumentError::BadLocation { offset, length })?;
        Ok(self.chars[offset..end].iter().collect())
    }
}

/// Assembles a [`TextDocument`] run by run.
///
/// ```
/// use viewtree_doc::{Attributes, Document, TextDocument};
///
/// let doc = TextDocument::builder()
///     .run("Hello ")
///     .run_with("world", Attributes::new().with("bold", true))
///     .end_paragraph()
///     .run("second")
///     .build();
/// assert_eq!(doc.length(), 18);
/// assert_eq!(doc.paragraphs().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextDocumentBuilder {
    finished: Vec<Vec<(String, Attributes)>>,
    current: Vec<(String, Attributes)>,
}

impl TextDocumentBuilder {
    /// Append a plain run to the current paragraph.
    #[must_use]
    pub fn run(self, text: &str) -> Self {
        self.run_with(text, Attributes::new())
    }

    /// Append a run with attributes to the current paragraph.
    ///
    /// Newlines inside `text` are replaced by spaces; use
    /// [`end_paragraph`](Self::end_paragraph) to break paragraphs.
    #[must_use]
    pub fn run_with(mut self, text: &str, attributes: Attributes) -> Self {
        self.current.push((text.replace('\n', " "), attributes));
        self
    }

    /// Close the current paragraph.
    #[must_use]
    pub fn end_paragraph(mut self) -> Self {
        self.finished.push(mem::take(&mut self.current));
        self
    }

    #[must_use]
    pub fn build(mut self) -> TextDocument {
        if !self.current.is_empty() || self.finished.is_empty() {
            self.finished.push(mem::take(&mut self.current));
        }

        let mut doc = TextDocument {
            chars: Vec::new(),
            elements: BTreeMap::new(),
            root: ElementId::MIN,
            next_id: ElementId::MIN,
        };
        doc.root = doc.allocate(ElementKind::Root, None);

        let mut paragraphs = Vec::with_capacity(self.finished.len());
        for mut runs in self.finished {
            // Empty runs carry nothing except the newline on the last one.
            runs.retain(|(text, _)| !text.is_empty());
            match runs.last_mut() {
                Some((text, _)) => text.push('\n'),
                None => runs.push(("\n".to_owned(), Attributes::new())),
            }
            let at = doc.chars.len();
            let mut specs = Vec::with_capacity(runs.len());
            for (text, attributes) in runs {
                let before = doc.chars.len();
                doc.chars.extend(text.chars());
                specs.push((doc.chars.len() - before, attributes));
            }
            paragraphs.push(doc.create_paragraph(at, specs));
        }
        if let Some(root) = doc.elements.get_mut(&doc.root) {
            root.children = paragraphs;
        }
        doc.reindex();
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs_of(doc: &TextDocument, paragraph: ElementId) -> Vec<String> {
        (0..doc.child_count(paragraph))
            .filter_map(|i| doc.child(paragraph, i))
            .map(|run| {
                let start = doc.start_offset(run);
                doc.text(start, doc.end_offset(run) - start).expect("run text")
            })
            .collect()
    }

    #[test]
    fn new_splits_lines_into_paragraphs() {
        let doc = TextDocument::new("ab\ncd");
        assert_eq!(doc.length(), 5);
        assert_eq!(doc.paragraphs().len(), 2);
        let root = doc.default_root();
        assert_eq!(doc.start_offset(root), 0);
        assert_eq!(doc.end_offset(root), 6);
        let p1 = doc.paragraphs()[1];
        assert_eq!((doc.start_offset(p1), doc.end_offset(p1)), (3, 6));
        assert_eq!(doc.name(p1), PARAGRAPH_NAME);
        assert_eq!(runs_of(&doc, p1), vec!["cd\n"]);
    }

    #[test]
    fn empty_document_has_one_paragraph() {
        let doc = TextDocument::default();
        assert_eq!(doc.length(), 0);
        assert_eq!(doc.paragraphs().len(), 1);
        assert_eq!(doc.end_offset(doc.default_root()), 1);
    }

    #[test]
    fn insert_without_newline_is_content_only() {
        let mut doc = TextDocument::new("abc");
        let event = doc.insert_string(1, "XY").expect("insert");
        assert_eq!(event.kind(), EventKind::Insert);
        assert_eq!((event.offset(), event.length()), (1, 2));
        assert!(event.changes().is_empty());
        assert_eq!(doc.content(), "aXYbc");
        let p = doc.paragraphs()[0];
        assert_eq!(doc.end_offset(p), 6);
    }

    #[test]
    fn insert_takes_preceding_run_attributes() {
        let mut doc = TextDocument::builder()
            .run_with("ab", Attributes::new().with("bold", true))
            .run("cd")
            .build();
        doc.insert_string(2, "!").expect("insert");
        let p = doc.paragraphs()[0];
        assert_eq!(runs_of(&doc, p), vec!["ab!", "cd\n"]);
    }

    #[test]
    fn insert_newline_replaces_paragraph() {
        let mut doc = TextDocument::new("one\ntwo");
        let old = doc.paragraphs()[1];
        let event = doc.insert_string(5, "\n123").expect("insert");
        let change = event.change_for(doc.default_root()).expect("root change");
        assert_eq!(change.index, 1);
        assert_eq!(change.removed, vec![old]);
        assert_eq!(change.added.len(), 2);
        assert_eq!(doc.content(), "one\nt\n123wo");
        assert_eq!(doc.paragraphs().len(), 3);
        assert_eq!(runs_of(&doc, doc.paragraphs()[1]), vec!["t\n"]);
        assert_eq!(runs_of(&doc, doc.paragraphs()[2]), vec!["123wo\n"]);
        assert_eq!(doc.start_offset(old), 0, "removed ids are forgotten");
    }

    #[test]
    fn remove_inside_run_is_content_only() {
        let mut doc = TextDocument::new("hello");
        let event = doc.remove(1, 3).expect("remove");
        assert!(event.changes().is_empty());
        assert_eq!(doc.content(), "ho");
    }

    #[test]
    fn remove_emptying_run_reports_paragraph_change() {
        let mut doc = TextDocument::builder().run("ab").run("cd").run("ef").build();
        let p = doc.paragraphs()[0];
        let middle = doc.child(p, 1).expect("run");
        let event = doc.remove(1, 4).expect("remove");
        let change = event.change_for(p).expect("paragraph change");
        assert_eq!(change.index, 1);
        assert_eq!(change.removed, vec![middle]);
        assert!(change.added.is_empty());
        assert_eq!(runs_of(&doc, p), vec!["a", "f\n"]);
    }

    #[test]
    fn remove_across_paragraphs_merges() {
        let mut doc = TextDocument::new("ab\ncd\nef");
        let event = doc.remove(1, 3).expect("remove");
        let change = event.change_for(doc.default_root()).expect("root change");
        assert_eq!(change.index, 0);
        assert_eq!(change.removed.len(), 2);
        assert_eq!(change.added.len(), 1);
        assert_eq!(doc.content(), "ad\nef");
        assert_eq!(runs_of(&doc, doc.paragraphs()[0]), vec!["a", "d\n"]);
    }

    #[test]
    fn remove_exact_newline_merges_neighbours() {
        let mut doc = TextDocument::new("ab\ncd");
        doc.remove(2, 1).expect("remove");
        assert_eq!(doc.paragraphs().len(), 1);
        assert_eq!(doc.content(), "abcd");
    }

    #[test]
    fn out_of_range_edits_fail() {
        let mut doc = TextDocument::new("abc");
        assert_eq!(
            doc.insert_string(4, "x"),
            Err(DocumentError::BadLocation { offset: 4, length: 0 })
        );
        assert_eq!(
            doc.remove(2, 2),
            Err(DocumentError::BadLocation { offset: 2, length: 2 })
        );
        assert!(doc.text(0, 4).is_ok(), "implicit newline is readable");
        assert!(doc.text(0, 5).is_err());
    }

    #[test]
    fn attribute_change_is_not_structural() {
        let mut doc = TextDocument::builder().run("ab").run("cd").build();
        let event = doc
            .set_run_attributes(3, 1, &Attributes::new().with("bold", true))
            .expect("attrs");
        assert_eq!(event.kind(), EventKind::Change);
        assert!(event.changes().is_empty());
        let p = doc.paragraphs()[0];
        let second = doc.child(p, 1).expect("run");
        assert!(doc.attributes(second).expect("attrs").flag("bold"));
        let first = doc.child(p, 0).expect("run");
        assert!(!doc.attributes(first).expect("attrs").flag("bold"));
    }

    #[test]
    fn element_index_clamps() {
        let doc = TextDocument::new("ab\ncd");
        let root = doc.default_root();
        assert_eq!(doc.element_index(root, 0), 0);
        assert_eq!(doc.element_index(root, 2), 0);
        assert_eq!(doc.element_index(root, 3), 1);
        assert_eq!(doc.element_index(root, 99), 1);
    }
}
