//! Relay element.
//!
//! Every group owns one relay element, registered as a custom element that
//! is never rendered. The relay travels with the group's holding container;
//! its lifecycle reactions tell the group that it has been inserted
//! somewhere.

use std::sync::Once;

use crate::document::Document;
use crate::registry::{self, ElementDefinition};
use crate::tree::NodeId;

/// Element name of relays.
pub(crate) const RELAY_NAME: &str = "group-relay";

/// Registers the relay element.
///
/// The name is reserved, so no other definition can shadow it.
pub(crate) fn ensure_defined() {
    static DEFINE: Once = Once::new();
    DEFINE.call_once(|| {
        let definition = ElementDefinition {
            connected: Some(on_connected),
            disconnected: Some(on_disconnected),
            rendered: false,
        };
        registry::define_reserved(RELAY_NAME, definition);
    });
}

/// Attaches the group owning the relay.
fn on_connected(doc: &mut Document, relay: NodeId) {
    if let Some(group) = doc.groups.owner_of_relay(relay) {
        super::attach(doc, group);
    }
}

/// Lets the group owning the relay notice the detachment.
fn on_disconnected(doc: &mut Document, relay: NodeId) {
    if let Some(group) = doc.groups.owner_of_relay(relay) {
        super::note_detached(doc, group);
    }
}
