//! Helpers shared by integration tests.

use std::sync::Once;

use nodegroup::{Document, GroupId, NodeId};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TEST_SETUP: Once = Once::new();

/// Installs a logger writing to the captured test output, filtered by
/// `RUST_LOG` (default `debug`).
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_test_writer()
                .with_target(true)
                .with_filter(env_filter),
        );
        if tracing::dispatcher::has_been_set() {
            tracing::debug!("tracing subscriber already set");
        } else if let Err(e) = subscriber.try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
    });
}

/// Creates an element appended to the document node.
pub fn connected_element(doc: &mut Document, name: &str) -> NodeId {
    let element = doc.create_element(name);
    let root = doc.root();
    doc.append(root, [element])
        .expect("a fresh element can be appended to the document");
    element
}

/// Inserts the group as the last children of `parent`.
pub fn attach(doc: &mut Document, group: GroupId, parent: NodeId) {
    doc.append(parent, [group])
        .expect("a live group can be inserted");
}
