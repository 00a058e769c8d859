//! Group configuration.

/// How far group mutations reach into the document tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Mirroring {
    /// Every mutation keeps the tree and the membership index in sync.
    #[default]
    Full,
    /// `insert_before`, `replace_child` and `remove_child` only touch the
    /// index, and `remove` / `replace_with` leave the index untouched.
    ///
    /// Members touched by index-only operations are not moved in the tree
    /// until the next attach.
    Partial,
}

/// Options fixed at group creation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
#[non_exhaustive]
pub struct GroupOptions {
    /// Tree mirroring mode.
    pub mirroring: Mirroring,
}

impl GroupOptions {
    /// Creates the default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mirroring mode.
    #[inline]
    #[must_use]
    pub fn mirroring(mut self, mirroring: Mirroring) -> Self {
        self.mirroring = mirroring;
        self
    }

    /// Returns true if membership-only operations are mirrored into the tree.
    #[inline]
    #[must_use]
    pub(crate) fn mirrors_tree(self) -> bool {
        self.mirroring == Mirroring::Full
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_config() {
        let options: GroupOptions =
            serde_json::from_str(r#"{"mirroring": "partial"}"#).expect("valid config");
        assert_eq!(options.mirroring, Mirroring::Partial);

        let defaults: GroupOptions = serde_json::from_str("{}").expect("valid config");
        assert_eq!(defaults, GroupOptions::default());
    }
}
