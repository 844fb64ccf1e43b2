//! Builds a DN tree out of a flat list of entries.
//!
//! Entries are kept once in a flat table; parent/child links are recorded as
//! indices into that table and only turned into owned nested entries in a
//! final materialization pass.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ldif::dn::parent_dn;
use crate::models::{AttrValue, Entry};

/// Child-list key used when the caller does not pick one.
pub const DEFAULT_PARENT_ATTRIBUTE: &str = "subEntries";

/// Nest `entries` under their DN parents.
///
/// Returns the root entries in input order. Entries with children carry
/// them under `parent_attribute`; leaves carry no such key. An entry whose
/// parent DN is not present (or whose `dn` is missing or multi-valued) is a
/// root. If several entries share a DN, the first one receives the children.
pub fn nest(entries: Vec<Entry>, parent_attribute: &str) -> Vec<Entry> {
    let total = entries.len();
    let links = Links::resolve(&entries);

    let mut table: Vec<Option<Entry>> = entries.into_iter().map(Some).collect();
    let roots: Vec<Entry> = links
        .roots
        .iter()
        .filter_map(|&idx| materialize(idx, &mut table, &links.children, parent_attribute))
        .collect();

    debug!(
        entries = total,
        roots = roots.len(),
        parent_attribute,
        "nested entries by DN"
    );
    roots
}

/// Parent/child relations as indices into the input slice.
struct Links {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
}

impl Links {
    fn resolve(entries: &[Entry]) -> Self {
        let mut by_dn: HashMap<&str, usize> = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(dn) = entry.dn() {
                by_dn.entry(dn).or_insert(idx);
            }
        }

        let mut roots = Vec::new();
        let mut children = vec![Vec::new(); entries.len()];
        for (idx, entry) in entries.iter().enumerate() {
            let parent = entry
                .dn()
                .and_then(parent_dn)
                .and_then(|key| by_dn.get(key).copied());
            match parent {
                Some(parent) => children[parent].push(idx),
                None => roots.push(idx),
            }
        }

        Self { roots, children }
    }
}

/// Move entry `idx` out of the table and attach its (already nested) children.
///
/// A parent DN is always strictly shorter than the child's DN, so links can
/// never form a cycle and each index is taken exactly once.
fn materialize(
    idx: usize,
    table: &mut [Option<Entry>],
    children: &[Vec<usize>],
    parent_attribute: &str,
) -> Option<Entry> {
    let mut entry = table[idx].take()?;
    if children[idx].is_empty() {
        return Some(entry);
    }

    let nested: Vec<Entry> = children[idx]
        .iter()
        .filter_map(|&child| materialize(child, table, children, parent_attribute))
        .collect();

    if let Some(replaced) = entry.insert(parent_attribute, AttrValue::Nested(nested)) {
        warn!(
            dn = entry.dn().unwrap_or_default(),
            parent_attribute,
            replaced = ?replaced,
            "child list replaced an existing attribute"
        );
    }
    Some(entry)
}
