//! Typed 128-bit identifiers for network objects.
//!
//! Every identifier wraps a random (v4) [`Uuid`] and round-trips through the
//! canonical hyphenated string form. [`ObjectId`] is the untyped form used by
//! provenance records, which may point at any kind of object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.hyphenated().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Identifier of any network object, as referenced from provenance.
    ObjectId
);
define_id!(StateId);
define_id!(PathwayId);
define_id!(ReactionId);
define_id!(EnsembleId);
define_id!(ProvenanceId);

macro_rules! into_object_id {
    ($($name:ident),+) => {
        $(
            impl From<$name> for ObjectId {
                fn from(id: $name) -> Self {
                    ObjectId(id.0)
                }
            }

            impl From<ObjectId> for $name {
                fn from(id: ObjectId) -> Self {
                    $name(id.0)
                }
            }
        )+
    };
}

into_object_id!(StateId, PathwayId, ReactionId, EnsembleId);
