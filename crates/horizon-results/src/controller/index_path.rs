//! Two-level addresses into sectioned content.

use std::fmt;

/// The position of an object: a section index plus an item index within it.
///
/// Index paths order by section first, then by item. They are only
/// meaningful against the content they were obtained from; any change batch
/// may invalidate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// Index of the section.
    pub section: usize,
    /// Index of the item within the section.
    pub item: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// The path addressing a whole section (item 0).
    #[inline]
    pub const fn for_section(section: usize) -> Self {
        Self { section, item: 0 }
    }

    /// `(0, 0)`, also used as the placeholder position.
    #[inline]
    pub const fn zero() -> Self {
        Self { section: 0, item: 0 }
    }

    /// The same item index in another section.
    #[inline]
    pub const fn with_section(self, section: usize) -> Self {
        Self {
            section,
            item: self.item,
        }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}
