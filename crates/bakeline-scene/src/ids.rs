//! Typed arena indices.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the arena slot this id points at.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

arena_id!(
    /// Index of an [`Object`](crate::Object) in its scene.
    ObjectId,
    "object"
);
arena_id!(
    /// Index of a [`Mesh`](crate::Mesh) in its scene.
    MeshId,
    "mesh"
);
arena_id!(
    /// Index of a [`Material`](crate::Material) in its scene.
    MaterialId,
    "material"
);
arena_id!(
    /// Index of an [`ImageBuffer`](crate::ImageBuffer) in its scene.
    ImageId,
    "image"
);
arena_id!(
    /// Index of a [`SceneGroup`](crate::SceneGroup) in its scene.
    GroupId,
    "group"
);
