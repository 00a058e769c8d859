//! Movable, order-preserving node groups over an arena document tree.
//!
//! A [`Document`] is a small DOM-like tree: elements, text nodes,
//! fragments, and lifecycle reactions for registered custom elements. A
//! group ([`GroupId`], accessed via [`Document::group`] and
//! [`Document::group_mut`]) is a live handle to an ordered set of sibling
//! nodes. Unlike a fragment, a group keeps its members after being
//! inserted: inserting it again moves all members to the new place.
//!
//! ```
//! use nodegroup::Document;
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! let first = doc.create_element("p");
//! let second = doc.create_element("p");
//! doc.append(root, [first, second]).expect("fresh elements can be appended");
//!
//! let group = doc.create_group();
//! doc.group_mut(group).expect("just created").append(["A", "B", "C"]);
//!
//! doc.append(first, [group]).expect("groups can be inserted");
//! assert_eq!(doc.text_content(first), "ABC");
//!
//! doc.append(second, [group]).expect("groups can be inserted");
//! assert_eq!(doc.text_content(first), "");
//! assert_eq!(doc.text_content(second), "ABC");
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

pub mod document;
pub mod error;
pub mod group;
mod nonmax;
pub mod ordered;
pub mod registry;
pub mod tree;

pub use self::document::{Content, Document, Element, Node, NodeData};
pub use self::error::{GroupError, RegistryError, StructureError};
pub use self::group::{Group, GroupId, GroupMut, GroupOptions, Mirroring};
pub use self::ordered::{OrderedIndex, Rejection};
pub use self::tree::{InsertAs, NodeId};
