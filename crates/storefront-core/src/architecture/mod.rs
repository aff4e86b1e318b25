//! Materializes the flat dotted codes of an attribute type into a display tree.
//!
//! Codes such as `"1.2.3"` name their ancestors by prefix (`"1"`, `"1.2"`).
//! Ancestors that have no entry of their own are inserted as stub nodes so the
//! tree is always connected under the reserved root code `"0"`. The tree is a
//! per-request value; it is rebuilt from the current entries every time.

use crate::error::{Result, StorefrontError};
use crate::models::{ArchitectureNode, CodeEntry, ROOT_CODE};

mod ordering;

pub use ordering::{NaturalCodeOrder, NodeOrdering, SectionOrder, compare_codes};

const SEGMENT_SEPARATOR: char = '.';

pub fn build_tree(
    type_key: &str,
    entries: &[CodeEntry],
    ordering: &dyn NodeOrdering,
) -> Result<ArchitectureNode> {
    for entry in entries {
        validate_entry(type_key, entry)?;
    }

    let mut root = entries
        .iter()
        .rev()
        .find(|entry| entry.is_root())
        .map(|entry| ArchitectureNode::new(ROOT_CODE, &entry.label, &entry.description))
        .ok_or_else(|| {
            StorefrontError::InvalidInput(format!(
                "attribute type {type_key} has no root code \"{ROOT_CODE}\""
            ))
        })?;

    for entry in entries.iter().filter(|entry| !entry.is_root()) {
        insert_entry(&mut root, entry);
    }

    sort_children(&mut root, ordering);
    Ok(root)
}

fn validate_entry(type_key: &str, entry: &CodeEntry) -> Result<()> {
    if entry.type_key != type_key {
        return Err(StorefrontError::InvalidInput(format!(
            "code {} belongs to type {}, not {type_key}",
            entry.code, entry.type_key
        )));
    }
    if entry.code.split(SEGMENT_SEPARATOR).any(str::is_empty) {
        return Err(StorefrontError::InvalidInput(format!(
            "code '{}' of type {type_key} has an empty segment",
            entry.code
        )));
    }
    // "0" may only appear alone; "0.x" would shadow the root.
    if !entry.is_root() && entry.code.split(SEGMENT_SEPARATOR).next() == Some(ROOT_CODE) {
        return Err(StorefrontError::InvalidInput(format!(
            "code '{}' of type {type_key} starts with the reserved root segment",
            entry.code
        )));
    }
    Ok(())
}

fn insert_entry(root: &mut ArchitectureNode, entry: &CodeEntry) {
    let segments = entry.code.split(SEGMENT_SEPARATOR).collect::<Vec<_>>();

    let mut parent = root;
    for depth in 1..segments.len() {
        let prefix = segments[..depth].join(".");
        let existing = parent
            .children
            .iter()
            .position(|child| child.code == prefix);
        let index = match existing {
            Some(index) => index,
            None => {
                parent.children.push(ArchitectureNode::stub(prefix));
                parent.children.len() - 1
            }
        };
        parent = &mut parent.children[index];
    }

    if let Some(existing) = parent
        .children
        .iter_mut()
        .find(|child| child.code == entry.code)
    {
        existing.name.clone_from(&entry.label);
        existing.description.clone_from(&entry.description);
        return;
    }
    parent.children.push(ArchitectureNode::new(
        &entry.code,
        &entry.label,
        &entry.description,
    ));
}

fn sort_children(node: &mut ArchitectureNode, ordering: &dyn NodeOrdering) {
    for child in &mut node.children {
        sort_children(child, ordering);
    }
    node.children.sort_by(|a, b| ordering.compare(a, b));
}
