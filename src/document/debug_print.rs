//! Pretty printer of a subtree.

use core::fmt;

use crate::document::{DftEvent, Document};
use crate::tree::NodeId;

/// Printable proxy to a subtree.
///
/// ```text
/// <ul>
/// |-- <li>
/// |   `-- "one"
/// `-- <li>
///     `-- "two"
/// ```
#[derive(Clone, Copy)]
pub struct DebugPrint<'a> {
    /// Document.
    doc: &'a Document,
    /// Toplevel node.
    id: NodeId,
}

impl<'a> DebugPrint<'a> {
    /// Creates a printer for the alive node.
    #[inline]
    #[must_use]
    pub(super) fn new(doc: &'a Document, id: NodeId) -> Self {
        Self { doc, id }
    }
}

impl fmt::Display for DebugPrint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whether each open ancestor below the toplevel is a last child.
        let mut open_levels: Vec<bool> = Vec::new();
        for ev in self.doc.descendants(self.id) {
            match ev {
                DftEvent::Open(node) => {
                    let data = self
                        .doc
                        .data(node)
                        .expect("[consistency] the node being traversed must be alive");
                    if node == self.id {
                        write!(f, "{}", data)?;
                        continue;
                    }
                    f.write_str("\n")?;
                    for &is_last in &open_levels {
                        f.write_str(if is_last { "    " } else { "|   " })?;
                    }
                    let is_last = self
                        .doc
                        .node(node)
                        .map_or(true, |node| node.next_sibling_id().is_none());
                    f.write_str(if is_last { "`-- " } else { "|-- " })?;
                    write!(f, "{}", data)?;
                    open_levels.push(is_last);
                }
                DftEvent::Close(node) if node != self.id => {
                    open_levels.pop();
                }
                DftEvent::Close(_) => {}
            }
        }
        Ok(())
    }
}

impl fmt::Debug for DebugPrint<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_lists() {
        let mut doc = Document::new();
        let list = doc.create_element("ul");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        doc.append(first, ["one"]).expect("fresh nodes");
        doc.append(second, ["two"]).expect("fresh nodes");
        doc.append(list, [first, second]).expect("fresh nodes");

        let printed = doc.debug_print(list).expect("alive").to_string();
        insta::assert_snapshot!(printed, @r###"
        <ul>
        |-- <li>
        |   `-- "one"
        `-- <li>
            `-- "two"
        "###);
    }
}
