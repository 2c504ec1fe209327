//! Dense, graph-local identifiers.
//!
//! A `NodeId` or `EdgeId` is a position in the SoA arrays of one road
//! network.  It means nothing outside that network: pruning re-issues ids,
//! and the `drive` and `walk` graphs number their nodes independently.  The
//! source identifier of a node (e.g. its OSM id) is kept separately by the
//! network for reporting.

use std::fmt;

/// Generate a `u32` index wrapper with a short display tag (`n7`, `e12`).
macro_rules! graph_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident, tag = $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub u32);

        impl $name {
            /// Placeholder for "not assigned"; never issued by a builder.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Build an id from a `Vec` position, `None` past `u32::MAX - 1`.
            #[inline]
            pub fn from_index(i: usize) -> Option<$name> {
                u32::try_from(i).ok().filter(|&v| v != u32::MAX).map($name)
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($tag, "{}"), self.0)
                } else {
                    f.write_str(concat!($tag, "?"))
                }
            }
        }
    };
}

graph_index! {
    /// Index of a road-network node.
    pub struct NodeId, tag = "n";
}

graph_index! {
    /// Index of a directed road-network edge.
    pub struct EdgeId, tag = "e";
}
