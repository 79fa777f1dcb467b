//! Property tests: arbitrary edit sequences keep the element tree consistent.
//!
//! After every edit:
//! 1. Paragraphs partition the root range contiguously.
//! 2. Runs partition their paragraph contiguously and are never empty.
//! 3. Every paragraph ends with exactly one newline, at its last position.
//! 4. The root spans `length + 1`.
//! 5. Structural changes name only elements that existed before the edit.

use proptest::prelude::*;
use viewtree_doc::{Document, ElementId, TextDocument};

#[derive(Debug, Clone)]
enum Edit {
    Insert { at: usize, text: String },
    Remove { at: usize, len: usize },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..64, "[a-c\n]{1,4}").prop_map(|(at, text)| Edit::Insert { at, text }),
        (0usize..64, 1usize..6).prop_map(|(at, len)| Edit::Remove { at, len }),
    ]
}

fn known_ids(doc: &TextDocument) -> Vec<ElementId> {
    let mut ids = vec![doc.default_root()];
    for &p in doc.paragraphs() {
        ids.push(p);
        ids.extend((0..doc.child_count(p)).filter_map(|i| doc.child(p, i)));
    }
    ids
}

fn check_structure(doc: &TextDocument) -> Result<(), TestCaseError> {
    let root = doc.default_root();
    prop_assert_eq!(doc.start_offset(root), 0);
    prop_assert_eq!(doc.end_offset(root), doc.length() + 1);

    let mut cursor = 0;
    for &p in doc.paragraphs() {
        prop_assert_eq!(doc.start_offset(p), cursor);
        prop_assert!(doc.child_count(p) > 0);
        let mut run_cursor = cursor;
        for i in 0..doc.child_count(p) {
            let run = doc.child(p, i).expect("run");
            prop_assert_eq!(doc.start_offset(run), run_cursor);
            prop_assert!(doc.end_offset(run) > run_cursor, "empty run");
            run_cursor = doc.end_offset(run);
        }
        prop_assert_eq!(run_cursor, doc.end_offset(p));
        let text = doc
            .text(cursor, doc.end_offset(p) - cursor)
            .expect("paragraph text");
        prop_assert!(text.ends_with('\n'));
        prop_assert_eq!(text.matches('\n').count(), 1);
        cursor = doc.end_offset(p);
    }
    prop_assert_eq!(cursor, doc.end_offset(root));
    Ok(())
}

proptest! {
    #[test]
    fn edits_keep_tree_consistent(edits in prop::collection::vec(edit_strategy(), 1..24)) {
        let mut doc = TextDocument::new("abc\ndef");
        for edit in edits {
            let before = known_ids(&doc);
            let event = match edit {
                Edit::Insert { at, text } => doc.insert_string(at.min(doc.length()), &text),
                Edit::Remove { at, len } => {
                    let at = at.min(doc.length());
                    let len = len.min(doc.length() - at);
                    doc.remove(at, len)
                }
            };
            let event = event.expect("edit within bounds");
            for change in event.changes() {
                prop_assert!(before.contains(&change.element));
                for removed in &change.removed {
                    prop_assert!(before.contains(removed));
                }
            }
            check_structure(&doc)?;
        }
    }
}
