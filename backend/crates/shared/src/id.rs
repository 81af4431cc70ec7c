//! Typed Identifiers
//!
//! `Id<Marker>` keeps ids of different entities from being mixed up while
//! sharing one UUID-backed implementation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use uuid::Uuid;

pub struct Id<Marker> {
    uuid: Uuid,
    _marker: PhantomData<fn() -> Marker>,
}

impl<Marker> Id<Marker> {
    /// Random (v4) id
    pub fn new() -> Self {
        Uuid::new_v4().into()
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            uuid,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

// Implemented by hand so `Marker` needs no bounds.
impl<Marker> Clone for Id<Marker> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Marker> Copy for Id<Marker> {}

impl<Marker> PartialEq for Id<Marker> {
    fn eq(&self, other: &Self) -> bool {
        self.uuid == other.uuid
    }
}

impl<Marker> Eq for Id<Marker> {}

impl<Marker> Hash for Id<Marker> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uuid.hash(state);
    }
}

impl<Marker> Default for Id<Marker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Marker> fmt::Debug for Id<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.uuid).finish()
    }
}

/// Hyphenated lower-case UUID, the form used on the wire and in URLs
impl<Marker> fmt::Display for Id<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.uuid, f)
    }
}

impl<Marker> FromStr for Id<Marker> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Uuid>().map(Self::from_uuid)
    }
}

impl<Marker> From<Uuid> for Id<Marker> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<Marker> From<Id<Marker>> for Uuid {
    fn from(id: Id<Marker>) -> Self {
        id.uuid
    }
}

pub mod markers {
    /// A credential record
    pub struct Account;
}

pub type AccountId = Id<markers::Account>;
