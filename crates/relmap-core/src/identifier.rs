//! Node identifiers.
//!
//! Labels from the elements sheet are the unique keys of the graph. An
//! [`Id`] shares its text by reference count, so the graph, the layout and
//! the render model can all hold it cheaply. Ids live exactly as long as the
//! values holding them; a refresh that drops the old state drops its ids.

use std::{borrow::Borrow, convert::Infallible, fmt, sync::Arc};

use serde::{Serialize, Serializer};

/// Identifier of a node, the node's label.
///
/// Hashes and compares like its text, so maps keyed by `Id` can be looked
/// up with a `&str`.
///
/// # Examples
///
/// ```
/// use relmap_core::identifier::Id;
///
/// let lazarus = Id::new("Lazarus Group");
/// assert_eq!(lazarus, "Lazarus Group");
/// assert_eq!(lazarus, Id::new("Lazarus Group"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(Arc<str>);

impl Id {
    /// Creates an `Id` from its label text.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an owned copy of the identifier text.
    pub fn to_text(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Id {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for Id {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
