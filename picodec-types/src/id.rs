// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged 32-bit identifiers for P4Info objects.
//!
//! Every identifier packs an object kind and an index into one `u32`:
//!
//! ```text
//!  31      24 23                     8 7        0
//! +----------+------------------------+----------+
//! |   kind   |          index (24 bits)          |  field, action, table
//! +----------+------------------------+----------+
//! |   kind   | action index (16 bits) |  param   |  action parameter
//! +----------+------------------------+----------+
//! ```
//!
//! Decoding never relies on casts alone: each range is extracted with an
//! explicit mask, and unrecognised kind tags are rejected.

use crate::{Error, Result};
use core::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

const KIND_SHIFT: u32 = 24;
const INDEX_MASK: u32 = 0x00ff_ffff;
const PARENT_SHIFT: u32 = 8;
const PARENT_MASK: u32 = 0xffff;
const PARAM_MASK: u32 = 0xff;

/// Largest index representable by a field, action or table identifier.
pub const MAX_INDEX: u32 = INDEX_MASK;
/// Largest action index an action parameter identifier can refer to.
pub const MAX_PARENT_INDEX: u32 = PARENT_MASK;
/// Largest parameter index within one action.
pub const MAX_PARAM_INDEX: u32 = PARAM_MASK;

/// The class of object named by a [`P4Id`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ObjectKind {
    Action = 0x01,
    Table = 0x02,
    ActionParam = 0x03,
    Field = 0x04,
}

impl ObjectKind {
    /// Maps a raw kind tag back onto an [`ObjectKind`].
    #[inline]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(ObjectKind::Action),
            0x02 => Some(ObjectKind::Table),
            0x03 => Some(ObjectKind::ActionParam),
            0x04 => Some(ObjectKind::Field),
            _ => None,
        }
    }

    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ObjectKind::Action => "action",
            ObjectKind::Table => "table",
            ObjectKind::ActionParam => "action param",
            ObjectKind::Field => "field",
        })
    }
}

/// A decoded identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Object {
    Field(u32),
    Action(u32),
    Table(u32),
    ActionParam { action: u32, param: u32 },
}

impl Object {
    #[inline]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Object::Field(_) => ObjectKind::Field,
            Object::Action(_) => ObjectKind::Action,
            Object::Table(_) => ObjectKind::Table,
            Object::ActionParam { .. } => ObjectKind::ActionParam,
        }
    }

    /// The object's own index (for parameters, within the owning action).
    #[inline]
    pub const fn index(&self) -> u32 {
        match *self {
            Object::Field(i) | Object::Action(i) | Object::Table(i) => i,
            Object::ActionParam { param, .. } => param,
        }
    }

    /// Re-encode this object as an identifier.
    #[inline]
    pub const fn id(&self) -> P4Id {
        match *self {
            Object::Field(i) => P4Id::field(i),
            Object::Action(i) => P4Id::action(i),
            Object::Table(i) => P4Id::table(i),
            Object::ActionParam { action, param } => {
                P4Id::action_param(P4Id::action(action), param)
            }
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::ActionParam { action, param } => {
                write!(f, "param {param} of action {action}")
            }
            o => write!(f, "{} {}", o.kind(), o.index()),
        }
    }
}

/// A packed identifier naming a field, action, table or action parameter.
///
/// Construction is total: indices are masked to the bit budget of their
/// kind, and checking that an index is live is left to the registry.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    FromBytes,
    IntoBytes,
    KnownLayout,
    Immutable,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[repr(transparent)]
pub struct P4Id(u32);

impl P4Id {
    #[inline]
    const fn make(kind: ObjectKind, index: u32) -> Self {
        Self(((kind as u32) << KIND_SHIFT) | (index & INDEX_MASK))
    }

    /// Wraps a raw handle, e.g. one read off the wire.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn field(index: u32) -> Self {
        Self::make(ObjectKind::Field, index)
    }

    #[inline]
    pub const fn action(index: u32) -> Self {
        Self::make(ObjectKind::Action, index)
    }

    #[inline]
    pub const fn table(index: u32) -> Self {
        Self::make(ObjectKind::Table, index)
    }

    /// Names parameter `index` of `action`.
    ///
    /// Only the low 16 bits of the action's index are carried.
    #[inline]
    pub const fn action_param(action: P4Id, index: u32) -> Self {
        let parent = action.0 & PARENT_MASK;
        Self(
            ((ObjectKind::ActionParam as u32) << KIND_SHIFT)
                | (parent << PARENT_SHIFT)
                | (index & PARAM_MASK),
        )
    }

    /// The kind stored in this identifier, if the tag is recognised.
    #[inline]
    pub const fn kind(self) -> Option<ObjectKind> {
        ObjectKind::from_tag((self.0 >> KIND_SHIFT) as u8)
    }

    #[inline]
    pub const fn is_kind(self, kind: ObjectKind) -> bool {
        (self.0 >> KIND_SHIFT) == kind as u32
    }

    /// The object's index; for an action parameter, its position within
    /// the owning action.
    #[inline]
    pub const fn index(self) -> u32 {
        if self.is_kind(ObjectKind::ActionParam) {
            self.0 & PARAM_MASK
        } else {
            self.0 & INDEX_MASK
        }
    }

    /// For an action parameter, the index of its owning action.
    #[inline]
    pub const fn parent_index(self) -> Option<u32> {
        if self.is_kind(ObjectKind::ActionParam) {
            Some((self.0 >> PARENT_SHIFT) & PARENT_MASK)
        } else {
            None
        }
    }

    /// For an action parameter, the identifier of its owning action.
    #[inline]
    pub const fn parent_action(self) -> Option<P4Id> {
        match self.parent_index() {
            Some(i) => Some(P4Id::action(i)),
            None => None,
        }
    }

    /// Splits the identifier into its kind and indices.
    pub fn decode(self) -> Result<Object> {
        let kind = self.kind().ok_or(Error::UnknownId)?;

        Ok(match kind {
            ObjectKind::Field => Object::Field(self.0 & INDEX_MASK),
            ObjectKind::Action => Object::Action(self.0 & INDEX_MASK),
            ObjectKind::Table => Object::Table(self.0 & INDEX_MASK),
            ObjectKind::ActionParam => Object::ActionParam {
                action: (self.0 >> PARENT_SHIFT) & PARENT_MASK,
                param: self.0 & PARAM_MASK,
            },
        })
    }

    /// Decodes the identifier, requiring it to be of kind `expected`.
    pub fn decode_as(self, expected: ObjectKind) -> Result<Object> {
        let obj = self.decode()?;
        if obj.kind() != expected {
            return Err(Error::IdentifierKindMismatch);
        }

        Ok(obj)
    }
}

impl From<u32> for P4Id {
    #[inline]
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<P4Id> for u32 {
    #[inline]
    fn from(id: P4Id) -> Self {
        id.0
    }
}

impl From<Object> for P4Id {
    #[inline]
    fn from(obj: Object) -> Self {
        obj.id()
    }
}

impl fmt::Display for P4Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(k) => write!(f, "{k}:{:#010x}", self.0),
            None => write!(f, "?:{:#010x}", self.0),
        }
    }
}
