//! Strongly typed identifier wrappers for stored graph entities.
//!
//! Ids are the integer keys used by the graph store, not dense indices.  The
//! routing layer maps them onto its own dense slots per request.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw store key.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Store key of a road node (intersection).
    pub struct NodeId(u32);
}

typed_id! {
    /// Store key of an undirected road segment.  Both synthesized traversal
    /// directions share the id of the stored edge.
    pub struct EdgeId(u32);
}
