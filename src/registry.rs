//! Process-wide custom element definitions.
//!
//! A definition attaches lifecycle callbacks to every element with the
//! defined name, in every [`Document`]. Definitions can be added but never
//! replaced or removed.

use core::fmt;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::document::Document;
use crate::error::RegistryError;
use crate::tree::NodeId;

/// Lifecycle callback, invoked with the element the reaction is for.
pub type LifecycleCallback = fn(&mut Document, NodeId);

/// Custom element definition.
#[derive(Clone, Copy)]
pub struct ElementDefinition {
    /// Called after the element becomes connected to a document root.
    pub connected: Option<LifecycleCallback>,
    /// Called after the element stops being connected.
    pub disconnected: Option<LifecycleCallback>,
    /// Whether the element appears in serialized markup.
    pub rendered: bool,
}

impl Default for ElementDefinition {
    #[inline]
    fn default() -> Self {
        Self {
            connected: None,
            disconnected: None,
            rendered: true,
        }
    }
}

impl fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("rendered", &self.rendered)
            .finish()
    }
}

/// Returns the definitions table.
fn definitions() -> &'static RwLock<HashMap<String, ElementDefinition>> {
    static DEFINITIONS: OnceLock<RwLock<HashMap<String, ElementDefinition>>> = OnceLock::new();
    DEFINITIONS.get_or_init(Default::default)
}

/// Returns true if the name is usable for a custom element.
#[must_use]
fn is_valid_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.contains('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'))
}

/// Names only the crate itself may define.
const RESERVED_NAMES: &[&str] = &[crate::group::RELAY_NAME];

/// Defines a custom element unless the name is already defined.
///
/// Returns `Ok(true)` if the definition was added, `Ok(false)` if an
/// existing definition was kept.
///
/// # Errors
///
/// * [`RegistryError::InvalidName`] if the name is not lowercase ASCII
///   starting with a letter and containing a hyphen.
/// * [`RegistryError::Reserved`] if the name is used by the crate itself.
pub fn define(name: &str, definition: ElementDefinition) -> Result<bool, RegistryError> {
    if !is_valid_name(name) {
        return Err(RegistryError::InvalidName(name.to_owned()));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(RegistryError::Reserved(name.to_owned()));
    }
    Ok(insert_definition(name, definition))
}

/// Defines an element with a reserved name unless already defined.
pub(crate) fn define_reserved(name: &'static str, definition: ElementDefinition) -> bool {
    debug_assert!(
        RESERVED_NAMES.contains(&name),
        "[precondition] the name must be reserved"
    );
    insert_definition(name, definition)
}

/// Adds the definition unless the name is taken. Returns true if added.
fn insert_definition(name: &str, definition: ElementDefinition) -> bool {
    let mut table = definitions()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    if table.contains_key(name) {
        return false;
    }
    table.insert(name.to_owned(), definition);
    tracing::debug!(name, "custom element defined");

    true
}

/// Returns the definition for the element name.
#[must_use]
pub fn get(name: &str) -> Option<ElementDefinition> {
    definitions()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .copied()
}

/// Returns true if the element name has a definition.
#[inline]
#[must_use]
pub fn is_defined(name: &str) -> bool {
    get(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Document, _: NodeId) {}

    #[test]
    fn names_need_a_hyphen() {
        assert_eq!(
            define("plain", ElementDefinition::default()),
            Err(RegistryError::InvalidName("plain".into()))
        );
        assert_eq!(
            define("Upper-case", ElementDefinition::default()),
            Err(RegistryError::InvalidName("Upper-case".into()))
        );
        assert!(!is_defined("plain"));
    }

    #[test]
    fn reserved_names_are_refused() {
        let hijack = ElementDefinition {
            connected: Some(noop),
            ..ElementDefinition::default()
        };
        assert_eq!(
            define(crate::group::RELAY_NAME, hijack),
            Err(RegistryError::Reserved(crate::group::RELAY_NAME.into()))
        );
    }

    #[test]
    fn first_definition_wins() {
        let first = ElementDefinition {
            connected: Some(noop),
            ..ElementDefinition::default()
        };
        let second = ElementDefinition {
            rendered: false,
            ..ElementDefinition::default()
        };
        assert_eq!(define("registry-test-first", first), Ok(true));
        assert_eq!(define("registry-test-first", second), Ok(false));
        let kept = get("registry-test-first").expect("defined above");
        assert!(kept.connected.is_some());
        assert!(kept.rendered);
    }
}
